//! Synthetic availability prober.
//!
//! # Data Flow
//! ```text
//! loop:
//!     shutdown requested? → exit
//!     → run_cycle (start clock → transport.get → stop clock → classify)
//!     → sink.report (one line per cycle)
//!     → sleep(interval) or shutdown → exit
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: one probe in flight at most, never a backlog
//! - The interval is slept after each cycle rather than ticked
//! - Failures are reported once and never retried early
//! - Any received response is a success; only transport errors fail

pub mod result;
pub mod sink;
pub mod transport;

use hyper::Uri;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{self, Instant};

use crate::config::ProberConfig;
use crate::observability::metrics;

pub use result::{ProbeOutcome, ProbeResult};
pub use sink::{ChannelSink, LogSink, ReportSink};
pub use transport::{HyperTransport, ProbeResponse, ProbeTransport, TransportError};

#[derive(Debug, Error)]
pub enum ProberError {
    #[error("invalid probe target `{target}`: {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// Runs one timed GET per interval against a fixed target.
pub struct Prober {
    target: Uri,
    interval: Duration,
    timeout: Duration,
    transport: Arc<dyn ProbeTransport>,
    sink: Arc<dyn ReportSink>,
}

impl Prober {
    pub fn new(
        config: &ProberConfig,
        transport: Arc<dyn ProbeTransport>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, ProberError> {
        let target = config
            .target
            .parse::<Uri>()
            .map_err(|e| ProberError::InvalidTarget {
                target: config.target.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            target,
            interval: config.interval(),
            timeout: config.timeout(),
            transport,
            sink,
        })
    }

    /// Perform and time a single probe. Never fails; errors land in the outcome.
    pub async fn run_cycle(&self) -> ProbeResult {
        let issued_at = SystemTime::now();
        let start = Instant::now();
        let call = match time::timeout(self.timeout, self.transport.get(&self.target)).await {
            Ok(call) => call,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        };
        let duration = start.elapsed();

        ProbeResult {
            target: self.target.clone(),
            issued_at,
            duration,
            outcome: ProbeOutcome::from_call(call),
        }
    }

    /// Probe until the shutdown signal fires (or its sender goes away).
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            uri = %self.target,
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            "Prober starting"
        );

        loop {
            if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
                tracing::info!("Prober received shutdown signal, exiting loop");
                break;
            }

            let result = self.run_cycle().await;
            self.sink.report(&result);
            metrics::record_probe(&result);

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Prober received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
