//! HTTP host for gate invocations.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace, invocation timeout)
//!     → gate_handler (path + method + deadline → InboundRequest)
//!     → Gate::handle
//!     → 200 JSON | 502 / 504 text
//! ```

pub mod server;

pub use server::GateServer;
