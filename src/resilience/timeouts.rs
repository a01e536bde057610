//! Timeout enforcement.
//!
//! # Responsibilities
//! - Derive the budget for an external call from a fixed ceiling and an
//!   optional caller deadline
//!
//! # Design Decisions
//! - Uses Tokio's clock so paused-time tests see exact budgets
//! - An already-expired deadline yields a zero budget, not an error

use std::time::Duration;
use tokio::time::Instant;

/// Budget for a call starting at `now`: the ceiling, cut short by `deadline`.
pub fn call_budget(ceiling: Duration, deadline: Option<Instant>, now: Instant) -> Duration {
    match deadline {
        Some(deadline) => ceiling.min(deadline.saturating_duration_since(now)),
        None => ceiling,
    }
}
