//! Probe cycle results.

use hyper::Uri;
use std::fmt;
use std::time::{Duration, SystemTime};

use crate::prober::transport::{ProbeResponse, TransportError};

/// How a single probe cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The target answered; any status counts.
    Success { status_code: u16, status_text: String },
    /// No response was obtained.
    Failure { error: String },
}

impl ProbeOutcome {
    pub fn from_call(call: Result<ProbeResponse, TransportError>) -> Self {
        match call {
            Ok(response) => ProbeOutcome::Success {
                status_code: response.status.as_u16(),
                status_text: response.status_text(),
            },
            Err(e) => ProbeOutcome::Failure {
                error: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Success { .. } => "success",
            ProbeOutcome::Failure { .. } => "failure",
        }
    }
}

/// One probe cycle, ready for the reporting sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub target: Uri,
    pub issued_at: SystemTime,
    pub duration: Duration,
    pub outcome: ProbeOutcome,
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ProbeOutcome::Success { status_text, .. } => write!(
                f,
                "Request to {} - Status: {} | Duration: {:?}",
                self.target, status_text, self.duration
            ),
            ProbeOutcome::Failure { error } => write!(
                f,
                "Request to {} failed: {} (after {:?})",
                self.target, error, self.duration
            ),
        }
    }
}
