//! Command Relay - Binary Entry Point
//!
//! Reads configuration from the environment, binds the listener and serves
//! until Ctrl-C or SIGTERM.

use std::sync::Arc;

use command_relay::api::http::serve;
use command_relay::{AppState, RelayConfig, RelayResult};

#[tokio::main]
async fn main() -> RelayResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env()?;
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        auth = config.auth_enabled(),
        static_dir = %config.static_dir.display(),
        heartbeat_secs = config.heartbeat_interval.as_secs(),
        "Relay server listening"
    );

    let state = Arc::new(AppState::new(config));
    serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
