//! Decision oracle seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::gate::types::{FaultCheckDecision, FaultCheckRequest};

/// Why the oracle could not produce a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("oracle unreachable: {0}")]
    Unreachable(String),

    #[error("oracle request timed out")]
    Timeout,

    #[error("oracle returned status {0}")]
    Status(u16),

    #[error("malformed oracle response: {0}")]
    Decode(String),

    /// An active experiment asked for this request to fail.
    #[error("{0}")]
    Injected(String),
}

/// External fault-injection decision point.
///
/// Implementations must not cache: every call reflects the current state.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn invoke(&self, request: &FaultCheckRequest) -> Result<FaultCheckDecision, OracleError>;
}
