//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Validate URIs and socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::Config;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("prober.target `{uri}` is not a valid URI: {reason}")]
    InvalidTarget { uri: String, reason: String },

    #[error("prober.target scheme `{0}` is not supported (expected http)")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("gate.check_name must not be empty")]
    EmptyCheckName,

    #[error("{field} `{value}` is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("oracle.sidecar_url `{uri}` is not a valid URL: {reason}")]
    InvalidSidecarUrl { uri: String, reason: String },
}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.prober.target) {
        Ok(url) if url.scheme() != "http" => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {
            if let Err(e) = config.prober.target.parse::<hyper::Uri>() {
                errors.push(ValidationError::InvalidTarget {
                    uri: config.prober.target.clone(),
                    reason: e.to_string(),
                });
            }
        }
        Err(e) => errors.push(ValidationError::InvalidTarget {
            uri: config.prober.target.clone(),
            reason: e.to_string(),
        }),
    }

    let non_zero = [
        ("prober.interval_secs", config.prober.interval_secs),
        ("prober.timeout_secs", config.prober.timeout_secs),
        ("gate.oracle_timeout_ms", config.gate.oracle_timeout_ms),
        ("gate.invocation_timeout_ms", config.gate.invocation_timeout_ms),
        ("oracle.request_timeout_ms", config.oracle.request_timeout_ms),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.gate.check_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCheckName);
    }

    let addresses = [
        ("gate.bind_address", &config.gate.bind_address),
        ("observability.metrics_address", &config.observability.metrics_address),
    ];
    for (field, value) in addresses {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if let Err(e) = Url::parse(&config.oracle.sidecar_url) {
        errors.push(ValidationError::InvalidSidecarUrl {
            uri: config.oracle.sidecar_url.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
