//! Fault-injection gate.
//!
//! # Data Flow
//! ```text
//! InboundRequest (path, method, deadline)
//!     → types.rs (labels {"path", "method"})
//!     → handler.rs (start clock → oracle.invoke under a budget → stop clock)
//!     → GateResponse {active, impacted, processingTime}
//!       or GateError (oracle failure / deadline)
//!
//! Production oracle (sidecar.rs):
//!     POST experiment query → effect.rs (sample rate, apply latency/exception)
//! ```
//!
//! # Design Decisions
//! - Stateless: every invocation re-queries the oracle, nothing is cached
//! - Oracle failure is a handler failure, never a degraded success
//! - The oracle sits behind a trait so tests can script its answers

pub mod effect;
pub mod handler;
pub mod oracle;
pub mod sidecar;
pub mod types;

pub use handler::{Gate, GateError};
pub use oracle::{DecisionOracle, OracleError};
pub use sidecar::SidecarOracle;
pub use types::{
    FaultCheckDecision, FaultCheckRequest, GateResponse, InboundRequest, Labels, OracleLog,
};
