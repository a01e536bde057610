//! Reporting sinks for probe results.

use tokio::sync::mpsc;

use crate::prober::result::{ProbeOutcome, ProbeResult};

/// Receives every probe result exactly once, in cycle order.
pub trait ReportSink: Send + Sync {
    fn report(&self, result: &ProbeResult);
}

/// Writes one structured log event per cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, result: &ProbeResult) {
        let duration_ms = result.duration.as_millis() as u64;
        match &result.outcome {
            ProbeOutcome::Success { status_text, .. } => {
                tracing::info!(
                    uri = %result.target,
                    status = %status_text,
                    duration_ms,
                    "{}", result
                );
            }
            ProbeOutcome::Failure { error } => {
                tracing::warn!(
                    uri = %result.target,
                    error = %error,
                    duration_ms,
                    "{}", result
                );
            }
        }
    }
}

/// Forwards results to a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProbeResult>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProbeResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ReportSink for ChannelSink {
    fn report(&self, result: &ProbeResult) {
        if self.tx.send(result.clone()).is_err() {
            tracing::debug!(uri = %result.target, "Probe result receiver dropped");
        }
    }
}
