//! Experiments and the effects they apply to a request.
//!
//! An experiment arrives from the sidecar as loosely-typed JSON. Effects are
//! read leniently: latency may be a number, a numeric string, or
//! `{"ms": .., "jitter": ..}`; an exception may be a string or
//! `{"message": ..}`.

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_EXCEPTION: &str = "Exception injected by failure flag";

/// One experiment targeting the checked flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub failure_flag_name: Option<String>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub effect: Value,
}

impl Experiment {
    /// Probability of impacting a request, clamped to [0, 1]. Absent means 1.
    pub fn rate(&self) -> f64 {
        match self.rate {
            Some(rate) if rate.is_finite() => rate.clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    pub fn effect(&self) -> Effect {
        Effect::from_value(&self.effect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub ms: u64,
    pub jitter_ms: u64,
}

impl Latency {
    pub fn delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rng.gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.ms.saturating_add(jitter))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effect {
    pub latency: Option<Latency>,
    pub exception: Option<String>,
}

impl Effect {
    pub fn from_value(value: &Value) -> Self {
        Self {
            latency: value.get("latency").and_then(parse_latency),
            exception: value.get("exception").and_then(parse_exception),
        }
    }
}

fn parse_millis(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_latency(value: &Value) -> Option<Latency> {
    match value {
        Value::Object(fields) => Some(Latency {
            ms: fields.get("ms").and_then(parse_millis)?,
            jitter_ms: fields.get("jitter").and_then(parse_millis).unwrap_or(0),
        }),
        other => parse_millis(other).map(|ms| Latency { ms, jitter_ms: 0 }),
    }
}

fn parse_exception(value: &Value) -> Option<String> {
    match value {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::String(_) | Value::Bool(true) => Some(DEFAULT_EXCEPTION.to_string()),
        Value::Object(fields) => Some(
            fields
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_EXCEPTION)
                .to_string(),
        ),
        _ => None,
    }
}

/// What the sampled experiments do to one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Impact {
    pub impacted: bool,
    pub delay: Duration,
    pub exception: Option<String>,
}

impl Impact {
    pub fn plan(experiments: &[Experiment]) -> Self {
        Self::plan_with(experiments, &mut rand::thread_rng())
    }

    /// Latencies accumulate; the first exception wins.
    pub fn plan_with<R: Rng>(experiments: &[Experiment], rng: &mut R) -> Self {
        let mut impact = Impact::default();
        for experiment in experiments {
            if rng.gen::<f64>() >= experiment.rate() {
                continue;
            }
            impact.impacted = true;

            let effect = experiment.effect();
            if let Some(latency) = effect.latency {
                impact.delay += latency.delay(rng);
            }
            if impact.exception.is_none() {
                impact.exception = effect.exception;
            }
        }
        impact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    fn experiment(rate: Option<f64>, effect: Value) -> Experiment {
        Experiment {
            guid: None,
            failure_flag_name: Some("http-ingress".into()),
            rate,
            effect,
        }
    }

    #[test]
    fn test_latency_forms() {
        let plain = Effect::from_value(&json!({"latency": 250}));
        assert_eq!(plain.latency, Some(Latency { ms: 250, jitter_ms: 0 }));

        let text = Effect::from_value(&json!({"latency": " 40 "}));
        assert_eq!(text.latency, Some(Latency { ms: 40, jitter_ms: 0 }));

        let object = Effect::from_value(&json!({"latency": {"ms": 100, "jitter": 20}}));
        assert_eq!(object.latency, Some(Latency { ms: 100, jitter_ms: 20 }));

        let missing_ms = Effect::from_value(&json!({"latency": {"jitter": 20}}));
        assert_eq!(missing_ms.latency, None);
    }

    #[test]
    fn test_exception_forms() {
        let text = Effect::from_value(&json!({"exception": "boom"}));
        assert_eq!(text.exception.as_deref(), Some("boom"));

        let object = Effect::from_value(&json!({"exception": {"message": "kaput"}}));
        assert_eq!(object.exception.as_deref(), Some("kaput"));

        let bare = Effect::from_value(&json!({"exception": {}}));
        assert_eq!(bare.exception.as_deref(), Some(DEFAULT_EXCEPTION));

        assert_eq!(Effect::from_value(&json!({})), Effect::default());
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let latency = Latency { ms: 100, jitter_ms: 20 };
        for _ in 0..100 {
            let delay = latency.delay(&mut rng);
            assert!(delay >= Duration::from_millis(100) && delay <= Duration::from_millis(120));
        }
    }

    #[test]
    fn test_rate_zero_never_impacts() {
        let mut rng = StdRng::seed_from_u64(1);
        let experiments = vec![experiment(Some(0.0), json!({"latency": 500}))];
        for _ in 0..50 {
            assert_eq!(Impact::plan_with(&experiments, &mut rng), Impact::default());
        }
    }

    #[test]
    fn test_full_rate_combines_effects() {
        let mut rng = StdRng::seed_from_u64(1);
        let experiments = vec![
            experiment(None, json!({"latency": 100})),
            experiment(Some(1.0), json!({"latency": 50, "exception": "first"})),
            experiment(Some(1.0), json!({"exception": "second"})),
        ];

        let impact = Impact::plan_with(&experiments, &mut rng);
        assert!(impact.impacted);
        assert_eq!(impact.delay, Duration::from_millis(150));
        assert_eq!(impact.exception.as_deref(), Some("first"));
    }

    #[test]
    fn test_rate_is_clamped() {
        assert_eq!(experiment(Some(3.0), Value::Null).rate(), 1.0);
        assert_eq!(experiment(Some(-1.0), Value::Null).rate(), 0.0);
        assert_eq!(experiment(None, Value::Null).rate(), 1.0);
    }
}
