//! Listener lifecycle for the portal.
//!
//! [`start_server`] binds the configured address and serves the router
//! until `Ctrl-C` (or `SIGTERM` on Unix) arrives, then lets in-flight
//! requests finish. Expired sessions are cleared in the background while
//! it runs.

use std::sync::Arc;

use tracing::info;

use crate::router::build_router;
use crate::sessions::{SESSION_SWEEP_INTERVAL, sweep_sessions};
use crate::state::AppState;

/// Where the portal listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind, e.g. `0.0.0.0` or `127.0.0.1`.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port`, as shown in logs and errors.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serve the portal until a shutdown signal.
///
/// # Errors
///
/// [`ServerError::Bind`] when the address is unusable or taken,
/// [`ServerError::Serve`] when the accept loop fails.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| ServerError::Bind {
            address: config.address(),
            source: e,
        })?;
    let local = listener
        .local_addr()
        .map_or_else(|_| config.address(), |addr| addr.to_string());
    info!(address = %local, "Portal listening");

    let sweeper = tokio::spawn(sweep_sessions(
        state.sessions.clone(),
        SESSION_SWEEP_INTERVAL,
    ));
    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served.map_err(ServerError::Serve)?;

    info!("Portal stopped accepting connections");
    Ok(())
}

/// Resolve when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
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
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Listener failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The address could not be bound.
    #[error("cannot listen on {address}: {source}")]
    Bind {
        /// The `host:port` that was tried.
        address: String,
        /// The socket error.
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}
