//! flagprobe
//!
//! Runs the synthetic availability prober, the fault-injection gate host,
//! or both, until SIGINT/SIGTERM.
//!
//! ```text
//!   ┌──────────── prober ────────────┐        ┌──────────── gate ─────────────┐
//!   │ sleep → GET target → time it   │        │ HTTP request → labels         │
//!   │       → report line            │        │   → sidecar oracle (timed)    │
//!   └────────────────────────────────┘        │   → {active, impacted, ms}    │
//!                                             └───────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use flagprobe::config::{load_config, Config};
use flagprobe::gate::{Gate, OracleLog, SidecarOracle};
use flagprobe::http::GateServer;
use flagprobe::lifecycle::{signals, Shutdown};
use flagprobe::observability::{logging, metrics};
use flagprobe::prober::{HyperTransport, LogSink, Prober};

#[derive(Parser)]
#[command(name = "flagprobe")]
#[command(about = "Synthetic availability prober and fault-injection gate", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Default, PartialEq, Eq)]
enum Commands {
    /// Run only the prober loop
    Probe,
    /// Run only the gate host
    Gate,
    /// Run both
    #[default]
    All,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::from_env()?,
    };

    logging::init_logging(&config.observability);
    tracing::info!("flagprobe v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let command = cli.command.unwrap_or_default();
    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    if command != Commands::Gate && config.prober.enabled {
        let transport = HyperTransport::new(config.prober.user_agent.as_str());
        let prober = Prober::new(&config.prober, Arc::new(transport), Arc::new(LogSink))?;
        tasks.push(tokio::spawn(prober.run(shutdown.subscribe())));
    }

    if command != Commands::Probe && config.gate.enabled {
        let oracle = SidecarOracle::new(&config.oracle)?;
        tracing::info!(
            enabled = config.oracle.enabled,
            sidecar_url = %config.oracle.sidecar_url,
            "Decision oracle configured"
        );
        let gate = Gate::new(&config.gate, Arc::new(oracle), OracleLog::new(config.oracle.debug));
        let listener = TcpListener::bind(&config.gate.bind_address).await?;
        let server = GateServer::new(config.gate.clone(), gate);
        let server_shutdown = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = server.run(listener, server_shutdown).await {
                tracing::error!(error = %e, "Gate server failed");
            }
        }));
    }

    if tasks.is_empty() {
        tracing::warn!("Nothing enabled for this command, exiting");
        return Ok(());
    }

    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Task ended abnormally");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
