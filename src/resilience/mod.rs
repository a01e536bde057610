//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Oracle call from the gate:
//!     → timeouts.rs (budget = min(ceiling, invocation deadline - now))
//!     → expiry is a fatal gate error, never retried
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - No retries: the prober waits for its next cycle and the gate fails

pub mod timeouts;
