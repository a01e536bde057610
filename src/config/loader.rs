//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::Config;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that switches the decision oracle on.
pub const FAILURE_FLAGS_ENABLED: &str = "FAILURE_FLAGS_ENABLED";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, std::env::var(FAILURE_FLAGS_ENABLED).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl Config {
    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        apply_env_overrides(&mut config, std::env::var(FAILURE_FLAGS_ENABLED).ok());
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Any non-empty `FAILURE_FLAGS_ENABLED` value turns the oracle on.
pub fn apply_env_overrides(config: &mut Config, failure_flags_enabled: Option<String>) {
    if let Some(value) = failure_flags_enabled {
        if !value.trim().is_empty() {
            config.oracle.enabled = true;
        }
    }
}
