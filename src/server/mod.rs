//! HTTP decision service.
//!
//! Provides three endpoints:
//! - `/geolocation-lookup` - client-initiated lookup (GET or POST, nonce required)
//! - `/render-decision` - whether the host should emit the consent script
//! - `/diagnostics` - database state and the requester's location
//!
//! The host passes visitor roles in the `X-Consent-Roles` header.

mod handlers;
mod nonce;
mod types;

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use handlers::{diagnostics_handler, lookup_handler, render_decision_handler};
pub use nonce::{AcceptAnyNonce, NonceVerifier, SharedSecretNonce};
pub use types::{AppState, DiagnosticsResponse, ErrorResponse};

/// Builds the service routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/geolocation-lookup",
            get(lookup_handler).post(lookup_handler),
        )
        .route("/render-decision", get(render_decision_handler))
        .route("/diagnostics", get(diagnostics_handler))
        .with_state(state)
}

/// Binds 127.0.0.1 on `port` and serves until Ctrl-C.
pub async fn start_server(port: u16, state: AppState) -> Result<(), anyhow::Error> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind decision service to port {}: {}", port, e))?;

    log::info!("Decision service listening on http://127.0.0.1:{}/", port);
    log::info!("  - Lookup: http://127.0.0.1:{}/geolocation-lookup", port);
    log::info!("  - Render: http://127.0.0.1:{}/render-decision", port);
    log::info!("  - Diagnostics: http://127.0.0.1:{}/diagnostics", port);

    serve_on(listener, state).await
}

/// Serves on an already bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), anyhow::Error> {
    let app = build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow::anyhow!("Decision service error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down decision service");
}
