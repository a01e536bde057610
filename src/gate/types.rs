//! Gate request and response types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Label set sent with a fault check.
pub type Labels = BTreeMap<String, String>;

/// What the host runtime tells the gate about one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub path: String,
    pub method: Option<String>,
    /// Invocation deadline imposed by the host, if it has one.
    pub deadline: Option<Instant>,
}

impl InboundRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: None,
            deadline: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn labels(&self) -> Labels {
        let mut labels = Labels::new();
        labels.insert("path".to_string(), self.path.clone());
        if let Some(method) = &self.method {
            labels.insert("method".to_string(), method.clone());
        }
        labels
    }
}

/// Diagnostic channel handed to the oracle with each check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleLog {
    enabled: bool,
}

impl OracleLog {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn line(&self, check: &str, message: impl fmt::Display) {
        if self.enabled {
            tracing::debug!(target: "flagprobe::oracle", check = %check, "{}", message);
        }
    }
}

/// A single named fault check with its request-scoped context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultCheckRequest {
    pub name: String,
    pub labels: Labels,
    pub log: OracleLog,
}

impl FaultCheckRequest {
    pub fn log(&self, message: impl fmt::Display) {
        self.log.line(&self.name, message);
    }
}

/// The oracle's answer for one check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultCheckDecision {
    /// The check is enabled for this context.
    pub active: bool,
    /// The check altered (or would alter) this request.
    pub impacted: bool,
}

impl FaultCheckDecision {
    pub const INACTIVE: Self = Self {
        active: false,
        impacted: false,
    };
}

/// Payload returned to the caller of a gate invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResponse {
    pub active: bool,
    pub impacted: bool,
    #[serde(rename = "processingTime")]
    pub processing_time_millis: u64,
}

impl GateResponse {
    /// Elapsed time is truncated to whole milliseconds.
    pub fn new(decision: FaultCheckDecision, elapsed: Duration) -> Self {
        Self {
            active: decision.active,
            impacted: decision.impacted,
            processing_time_millis: elapsed.as_millis() as u64,
        }
    }
}
