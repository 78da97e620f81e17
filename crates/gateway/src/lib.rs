//! HTTP surface for Chaty.
//!
//! Endpoints:
//! - `GET /health`     — liveness probe
//! - `GET /api/ping`   — the classic pong
//! - `GET /pairing/qr` — current pairing QR image; 404 when no artifact exists
//!
//! Everything else gets a JSON 404, matching the bot's original surface.
//!
//! Built on Axum.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::get,
};
use chaty_pairing::PairingManager;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state for the gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub pairing: Arc<PairingManager>,
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/ping", get(ping_handler))
        .route("/pairing/qr", get(pairing_qr_handler))
        .fallback(not_found_handler)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn start(
    config: &chaty_config::GatewayConfig,
    state: GatewayState,
) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on http://{addr}");
    axum::serve(listener, build_router(state)).await
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn ping_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": "Pong!" }))
}

/// Serve the rendered pairing image, or 404 when no artifact exists.
async fn pairing_qr_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    let Some(path) = state.pairing.current_image().await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No pairing code is currently available." })),
        )
            .into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Pairing image read failed");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "No pairing code is currently available." })),
            )
                .into_response()
        }
    }
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "The resource you are looking for was not found!" })),
    )
}
