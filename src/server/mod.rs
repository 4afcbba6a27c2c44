//! Read API over the stored snapshots
//!
//! Serves the current stock per category, the capability listing, and a
//! forced-refresh endpoint that runs one scrape cycle through the scheduler.

mod errors;
mod handlers;

pub use errors::ApiError;
pub use handlers::{AppState, StockQuery};

use crate::config::ServerConfig;
use crate::schedule::CycleRunner;
use axum::{routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to determine local address: {source}")]
    LocalAddr {
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Builds the read API router
///
/// The stock routes live under `state.api_prefix`; the capability listing is
/// always at `/`.
pub fn build_router<R: CycleRunner>(state: AppState<R>) -> Router {
    let stock_path = format!("{}/stock", state.api_prefix);
    let refresh_path = format!("{}/stock/refresh", state.api_prefix);

    Router::new()
        .route("/", get(handlers::home::<R>))
        .route(&stock_path, get(handlers::stock::<R>))
        .route(&refresh_path, get(handlers::refresh::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the read API until Ctrl-C or SIGTERM
pub async fn serve<R: CycleRunner>(
    config: &ServerConfig,
    state: AppState<R>,
) -> Result<(), ServerError> {
    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::LocalAddr { source })?;
    tracing::info!("Read API listening on http://{}", local_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServerError::Serve { source })?;

    tracing::info!("Read API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
