//! Gateway wiring and the HTTP listener.
//!
//! The server stops accepting connections on CTRL+C or SIGTERM and lets
//! in-flight requests finish.

use crate::app::routes::{create_router, AppState};
use crate::config::Settings;
use crate::core::{KeyAuthorizer, OrderIngester, PretixOrderSource};
use crate::utils::error::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Builds the shared state for a validated [`Settings`].
pub fn build_state(settings: &Settings) -> Result<AppState> {
    let ingester = OrderIngester::new(settings.base_url.clone(), settings.request_timeout())?;

    Ok(AppState {
        authorizer: KeyAuthorizer::from_config(settings),
        orders: Arc::new(PretixOrderSource::new(ingester, settings)),
    })
}

/// Serves the gateway on `addr` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound.
pub async fn start_server(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received CTRL+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
