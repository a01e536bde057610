//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Prober and gate produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event for machine parsing
//! - Request ID from the gate host flows through the invocation span
//! - Metrics are cheap (atomic increments); a no-op without a recorder

pub mod logging;
pub mod metrics;
