//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for flagprobe.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Synthetic availability prober settings.
    pub prober: ProberConfig,

    /// Fault-injection gate settings.
    pub gate: GateConfig,

    /// Decision oracle (sidecar) settings.
    pub oracle: OracleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Prober configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProberConfig {
    /// Enable the probe loop.
    pub enabled: bool,

    /// URI probed with GET every cycle.
    pub target: String,

    /// Pause between the end of one cycle and the start of the next.
    pub interval_secs: u64,

    /// Upper bound on a single probe call.
    pub timeout_secs: u64,

    /// User-Agent header sent with each probe.
    pub user_agent: String,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: "http://www.example.com".to_string(),
            interval_secs: 5,
            timeout_secs: 10,
            user_agent: "flagprobe-prober".to_string(),
        }
    }
}

impl ProberConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Enable the local gate host.
    pub enabled: bool,

    /// Name of the fault check consulted on every invocation.
    pub check_name: String,

    /// Bind address for the local gate host (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Ceiling on a single oracle call, in milliseconds.
    pub oracle_timeout_ms: u64,

    /// Invocation deadline given to each inbound request, in milliseconds.
    pub invocation_timeout_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_name: "http-ingress".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            oracle_timeout_ms: 10_000,
            invocation_timeout_ms: 30_000,
        }
    }
}

impl GateConfig {
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_millis(self.invocation_timeout_ms)
    }
}

/// Decision oracle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OracleConfig {
    /// When false the oracle answers "inactive" without contacting the sidecar.
    pub enabled: bool,

    /// Experiment endpoint of the fault-injection sidecar.
    pub sidecar_url: String,

    /// HTTP timeout for one sidecar request, in milliseconds.
    pub request_timeout_ms: u64,

    /// Emit oracle diagnostic lines.
    pub debug: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sidecar_url: "http://localhost:5032/experiment".to_string(),
            request_timeout_ms: 1_000,
            debug: false,
        }
    }
}

impl OracleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.prober.target, "http://www.example.com");
        assert_eq!(config.prober.interval(), Duration::from_secs(5));
        assert_eq!(config.gate.check_name, "http-ingress");
        assert!(!config.oracle.enabled);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [prober]
            target = "http://127.0.0.1:9000/ping"

            [gate]
            oracle_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.prober.target, "http://127.0.0.1:9000/ping");
        assert_eq!(config.prober.interval_secs, 5);
        assert_eq!(config.gate.oracle_timeout(), Duration::from_millis(250));
        assert_eq!(config.gate.bind_address, "0.0.0.0:8080");
    }
}
