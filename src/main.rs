//! upgrade-proxy
//!
//! Terminates TLS on the secure listener and forwards every request to a
//! single target. A second, plaintext listener redirects to HTTPS.

use clap::Parser;
use std::process::ExitCode;

use upgrade_proxy::config::Args;
use upgrade_proxy::lifecycle::signals::wait_for_signal;
use upgrade_proxy::lifecycle::{StartupError, Supervisor};
use upgrade_proxy::observability::init_logging;
use upgrade_proxy::ProxyConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("upgrade-proxy: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("upgrade-proxy: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "upgrade-proxy starting");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let supervisor = Supervisor::bind(&config).await?;

    supervisor
        .run(async {
            let signal = wait_for_signal().await;
            tracing::info!(signal, "Received signal");
        })
        .await
}
