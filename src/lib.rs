//! Synthetic availability prober and fault-injection gate.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod prober;
pub mod resilience;

pub use config::Config;
pub use gate::Gate;
pub use http::GateServer;
pub use lifecycle::Shutdown;
pub use prober::Prober;
