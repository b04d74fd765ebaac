//! Leadership signalling sidecar
//!
//! Polls the election service, publishes this host's leadership flag to the
//! configured bucket and serves a liveness endpoint.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use signal_core::{serve_liveness, Signaller};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "leader_signal={0},signal_core={0},signal_store={0},tower_http={0}",
                    log_level
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting leader signal v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.load_config().map_err(|e| {
        error!("Invalid configuration: {:#}", e);
        e
    })?;

    let signaller = Signaller::from_config(&config).map_err(|e| {
        error!("Failed to start signaller: {}", e);
        e
    })?;

    tokio::select! {
        result = signaller.run() => {
            if let Err(e) = result {
                error!("Signaller stopped: {}", e);
                std::process::exit(1);
            }
        }
        result = serve_liveness(config.bind_address) => {
            if let Err(e) = result {
                error!("Liveness server failed: {}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Leader signal stopped");
    Ok(())
}
