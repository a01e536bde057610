//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!     → sections handed to the prober, gate and oracle constructors
//! ```
//!
//! # Design Decisions
//! - Config is fixed for the process lifetime; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::Config;
pub use schema::GateConfig;
pub use schema::ObservabilityConfig;
pub use schema::OracleConfig;
pub use schema::ProberConfig;
