//! Decision oracle backed by a local fault-injection sidecar.
//!
//! # Wire Contract
//! ```text
//! POST <sidecar_url>
//!     {"name": "<check>", "labels": {"path": "/..."}}
//! 204 / 404 / empty body  → no experiments
//! 200 {experiment} | [{experiment}, ...]
//! ```
//!
//! # Design Decisions
//! - Disabled oracle answers "inactive" without touching the network
//! - Effects are applied here, inside the timed oracle call, so the gate's
//!   processing time includes injected latency
//! - Transport failures surface as errors; the gate decides what they mean

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::config::OracleConfig;
use crate::gate::effect::{Experiment, Impact};
use crate::gate::oracle::{DecisionOracle, OracleError};
use crate::gate::types::{FaultCheckDecision, FaultCheckRequest, Labels};
use crate::prober::transport::describe;

#[derive(Serialize)]
struct ExperimentQuery<'a> {
    name: &'a str,
    labels: &'a Labels,
}

/// Client for the sidecar's experiment endpoint.
#[derive(Clone)]
pub struct SidecarOracle {
    client: Client,
    url: String,
    enabled: bool,
}

impl SidecarOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .no_proxy()
            .build()
            .map_err(|e| OracleError::Unreachable(describe(&e)))?;

        Ok(Self {
            client,
            url: config.sidecar_url.clone(),
            enabled: config.enabled,
        })
    }

    async fn fetch(&self, request: &FaultCheckRequest) -> Result<Vec<Experiment>, OracleError> {
        let query = ExperimentQuery {
            name: &request.name,
            labels: &request.labels,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        decode_experiments(&body)
    }
}

fn transport_error(error: reqwest::Error) -> OracleError {
    if error.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Unreachable(describe(&error))
    }
}

/// Parse a sidecar body: empty, `null`, one experiment, or an array of them.
pub fn decode_experiments(body: &[u8]) -> Result<Vec<Experiment>, OracleError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| OracleError::Decode(e.to_string()))?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value::<Experiment>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| OracleError::Decode(e.to_string())),
        Value::Object(_) => serde_json::from_value(value)
            .map(|experiment| vec![experiment])
            .map_err(|e| OracleError::Decode(e.to_string())),
        other => Err(OracleError::Decode(format!(
            "expected an experiment or a list of experiments, got {}",
            other
        ))),
    }
}

#[async_trait]
impl DecisionOracle for SidecarOracle {
    async fn invoke(&self, request: &FaultCheckRequest) -> Result<FaultCheckDecision, OracleError> {
        if !self.enabled {
            request.log("fault injection disabled, skipping sidecar");
            return Ok(FaultCheckDecision::INACTIVE);
        }

        let experiments = self.fetch(request).await?;
        if experiments.is_empty() {
            request.log("no experiments");
            return Ok(FaultCheckDecision::INACTIVE);
        }
        request.log(format_args!("{} experiment(s) active", experiments.len()));

        let impact = Impact::plan(&experiments);
        if !impact.delay.is_zero() {
            request.log(format_args!("injecting {:?} latency", impact.delay));
            tokio::time::sleep(impact.delay).await;
        }
        if let Some(message) = impact.exception {
            request.log(format_args!("injecting exception: {}", message));
            return Err(OracleError::Injected(message));
        }

        Ok(FaultCheckDecision {
            active: true,
            impacted: impact.impacted,
        })
    }
}
