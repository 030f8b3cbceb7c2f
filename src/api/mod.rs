//! HTTP API module - REST endpoints

mod generate;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::gemini::GeminiClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiClient>,
}

/// Build the API router
pub fn router(config: &Config) -> Router {
    let gemini = Arc::new(GeminiClient::new(config));

    let state = AppState { gemini };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(generate::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "imgd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
///
/// A missing upstream credential degrades the `upstream` field but does not
/// make the process unhealthy; the generate endpoint reports that itself.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        upstream: if state.gemini.is_configured() {
            "configured"
        } else {
            "unconfigured"
        },
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    upstream: &'static str,
}
