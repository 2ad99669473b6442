//! upwatchd — the upwatch monitoring daemon.
//!
//! Loads the endpoint list, starts the monitor loop, and translates
//! process signals into the loop's shutdown channel.
//!
//! # Usage
//!
//! ```text
//! upwatchd endpoints.yaml
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use upwatch_monitor::{Monitor, StatsRegistry, probe_client};

#[derive(Parser)]
#[command(name = "upwatchd", about = "Endpoint availability monitor")]
struct Cli {
    /// Path to the YAML endpoint list.
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,upwatchd=debug,upwatch=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let endpoints = upwatch_config::load_endpoints(&cli.config)?;
    if endpoints.is_empty() {
        warn!(path = %cli.config.display(), "endpoint list is empty; reports will list no domains");
    }
    info!(
        path = %cli.config.display(),
        endpoints = endpoints.len(),
        "configuration loaded"
    );

    let registry = StatsRegistry::new();
    let client = probe_client()?;
    let monitor = Monitor::new(endpoints, registry, client);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor_handle = tokio::spawn(async move {
        monitor.run(shutdown_rx).await;
    });

    wait_for_signal().await;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    let _ = monitor_handle.await;

    info!("upwatchd stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
