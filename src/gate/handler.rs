//! The gate invocation: label, ask, time, answer.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant};

use crate::config::GateConfig;
use crate::gate::oracle::{DecisionOracle, OracleError};
use crate::gate::types::{FaultCheckRequest, GateResponse, InboundRequest, OracleLog};
use crate::observability::metrics;
use crate::resilience::timeouts::call_budget;

/// Handler-level failure. No response payload exists when this is returned.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("fault check `{check}` failed: {source}")]
    Oracle {
        check: String,
        #[source]
        source: OracleError,
    },

    #[error("fault check `{check}` did not answer within {budget:?}")]
    DeadlineExceeded { check: String, budget: Duration },
}

impl GateError {
    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::Oracle { .. } => "oracle",
            GateError::DeadlineExceeded { .. } => "deadline",
        }
    }
}

/// Per-invocation fault check against one named flag.
///
/// Holds no per-request state; clones share the oracle.
#[derive(Clone)]
pub struct Gate {
    check_name: String,
    oracle_timeout: Duration,
    oracle: Arc<dyn DecisionOracle>,
    log: OracleLog,
}

impl Gate {
    pub fn new(config: &GateConfig, oracle: Arc<dyn DecisionOracle>, log: OracleLog) -> Self {
        Self {
            check_name: config.check_name.clone(),
            oracle_timeout: config.oracle_timeout(),
            oracle,
            log,
        }
    }

    /// The fault check sent to the oracle for `request`.
    pub fn fault_check(&self, request: &InboundRequest) -> FaultCheckRequest {
        FaultCheckRequest {
            name: self.check_name.clone(),
            labels: request.labels(),
            log: self.log,
        }
    }

    /// Query the oracle once and report the decision with its latency.
    ///
    /// The clock covers only the oracle call. Oracle errors and deadline
    /// expiry are returned as errors, never folded into a response.
    pub async fn handle(&self, request: &InboundRequest) -> Result<GateResponse, GateError> {
        let check = self.fault_check(request);

        let start = Instant::now();
        let budget = call_budget(self.oracle_timeout, request.deadline, start);
        let outcome = time::timeout(budget, self.oracle.invoke(&check)).await;
        let elapsed = start.elapsed();

        let decision = match outcome {
            Ok(Ok(decision)) => decision,
            Ok(Err(source)) => {
                return Err(self.fail(
                    request,
                    elapsed,
                    GateError::Oracle {
                        check: self.check_name.clone(),
                        source,
                    },
                ))
            }
            Err(_) => {
                return Err(self.fail(
                    request,
                    elapsed,
                    GateError::DeadlineExceeded {
                        check: self.check_name.clone(),
                        budget,
                    },
                ))
            }
        };

        let response = GateResponse::new(decision, elapsed);
        tracing::debug!(
            check = %self.check_name,
            path = %request.path,
            active = response.active,
            impacted = response.impacted,
            processing_ms = response.processing_time_millis,
            "Fault check answered"
        );
        metrics::record_gate(&self.check_name, &response, elapsed);

        Ok(response)
    }

    fn fail(&self, request: &InboundRequest, elapsed: Duration, error: GateError) -> GateError {
        tracing::warn!(
            check = %self.check_name,
            path = %request.path,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error,
            "Fault check failed"
        );
        metrics::record_gate_error(&self.check_name, &error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::types::{FaultCheckDecision, Labels};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers after a fixed delay and remembers what it was asked.
    struct ScriptedOracle {
        delay: Duration,
        reply: Result<FaultCheckDecision, OracleError>,
        seen: Mutex<Vec<FaultCheckRequest>>,
    }

    impl ScriptedOracle {
        fn new(delay_ms: u64, reply: Result<FaultCheckDecision, OracleError>) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(delay_ms),
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DecisionOracle for ScriptedOracle {
        async fn invoke(
            &self,
            request: &FaultCheckRequest,
        ) -> Result<FaultCheckDecision, OracleError> {
            self.seen.lock().unwrap().push(request.clone());
            time::sleep(self.delay).await;
            self.reply.clone()
        }
    }

    fn gate(oracle: Arc<ScriptedOracle>, oracle_timeout_ms: u64) -> Gate {
        let config = GateConfig {
            oracle_timeout_ms,
            ..GateConfig::default()
        };
        Gate::new(&config, oracle, OracleLog::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactive_decision_with_exact_timing() {
        let oracle = ScriptedOracle::new(2, Ok(FaultCheckDecision::INACTIVE));
        let gate = gate(oracle.clone(), 1_000);

        let response = gate.handle(&InboundRequest::new("/health")).await.unwrap();
        assert_eq!(
            response,
            GateResponse {
                active: false,
                impacted: false,
                processing_time_millis: 2
            }
        );

        let seen = oracle.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, "http-ingress");
        assert_eq!(
            seen[0].labels,
            Labels::from([("path".to_string(), "/health".to_string())])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_decision_copied() {
        let decision = FaultCheckDecision {
            active: true,
            impacted: false,
        };
        let gate = gate(ScriptedOracle::new(40, Ok(decision)), 1_000);

        let response = gate.handle(&InboundRequest::new("/")).await.unwrap();
        assert!(response.active);
        assert!(!response.impacted);
        assert_eq!(response.processing_time_millis, 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oracle_error_propagates() {
        let gate = gate(ScriptedOracle::new(1, Err(OracleError::Timeout)), 1_000);

        let err = gate.handle(&InboundRequest::new("/health")).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::Oracle {
                source: OracleError::Timeout,
                ..
            }
        ));
        assert_eq!(err.kind(), "oracle");
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_call_requeries() {
        let oracle = ScriptedOracle::new(1, Ok(FaultCheckDecision::INACTIVE));
        let gate = gate(oracle.clone(), 1_000);

        for _ in 0..3 {
            gate.handle(&InboundRequest::new("/a")).await.unwrap();
        }
        assert_eq!(oracle.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ceiling_bounds_hung_oracle() {
        let gate = gate(ScriptedOracle::new(60_000, Ok(FaultCheckDecision::INACTIVE)), 500);

        let start = Instant::now();
        let err = gate.handle(&InboundRequest::new("/slow")).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::DeadlineExceeded { budget, .. } if budget == Duration::from_millis(500)
        ));
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invocation_deadline_tightens_budget() {
        let gate = gate(ScriptedOracle::new(60_000, Ok(FaultCheckDecision::INACTIVE)), 10_000);
        let request =
            InboundRequest::new("/slow").with_deadline(Instant::now() + Duration::from_millis(120));

        let err = gate.handle(&request).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::DeadlineExceeded { budget, .. } if budget == Duration::from_millis(120)
        ));
        assert_eq!(err.kind(), "deadline");
    }

    #[tokio::test(start_paused = true)]
    async fn test_method_label_forwarded() {
        let oracle = ScriptedOracle::new(1, Ok(FaultCheckDecision::INACTIVE));
        let gate = gate(oracle.clone(), 1_000);

        let request = InboundRequest::new("/orders").with_method("POST");
        gate.handle(&request).await.unwrap();
        let seen = oracle.seen.lock().unwrap();
        assert_eq!(seen[0].labels.get("method").map(String::as_str), Some("POST"));
    }
}
