//! Image generation endpoint
//!
//! POST /api/generate - relay an image and prompt to the upstream generative
//! API and return the first generated image.

use axum::body::Bytes;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::gemini::GenerateError;

/// Build the generate router
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/generate",
        post(generate).fallback(method_not_allowed),
    )
}

/// Generation request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub image_data: Option<String>,
    pub prompt: Option<String>,
}

/// Generation response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image: String,
    pub mime_type: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Relay a generation request to the upstream API
async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    // The credential check comes first: a missing key is reported no matter
    // what the body contains.
    if !state.gemini.is_configured() {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "GEMINI_API_KEY not configured",
        );
    }

    // An unreadable body carries no fields, so it lands in the same 400 as a
    // body with fields absent or empty.
    let req: GenerateRequest = serde_json::from_slice(&body).unwrap_or_default();
    let (image_data, prompt) = match (req.image_data.as_deref(), req.prompt.as_deref()) {
        (Some(image), Some(prompt)) if !image.is_empty() && !prompt.is_empty() => (image, prompt),
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing imageData or prompt"),
    };

    match state.gemini.generate(image_data, prompt).await {
        Ok(image) => (
            StatusCode::OK,
            Json(GenerateResponse {
                image: image.data,
                mime_type: image.mime_type,
            }),
        )
            .into_response(),
        Err(err) => {
            let status = match err {
                GenerateError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
                GenerateError::AllModelsFailed(_) | GenerateError::NoImage => {
                    StatusCode::BAD_GATEWAY
                }
            };
            error_response(status, &err.to_string())
        }
    }
}

/// Fallback for non-POST methods on the generate route
async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
