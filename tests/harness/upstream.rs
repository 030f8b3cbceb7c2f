//! MockUpstream - in-process stand-in for the generative language API
//!
//! Serves the `models/{model}:generateContent` route with a scripted outcome
//! per model and records every request so tests can assert attempt order and
//! request shape.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

/// Scripted behavior for one model
#[derive(Clone)]
pub enum ModelScript {
    /// 200 with a text part followed by an inline image part
    Image {
        data: &'static str,
        mime_type: Option<&'static str>,
    },
    /// 200 with text-only parts, no inline data anywhere
    TextOnly,
    /// Non-success status with the given body
    Error { status: u16, body: String },
}

impl ModelScript {
    pub fn image(data: &'static str, mime_type: Option<&'static str>) -> Self {
        Self::Image { data, mime_type }
    }

    pub fn error(status: u16, body: &str) -> Self {
        Self::Error {
            status,
            body: body.to_string(),
        }
    }
}

/// One observed generateContent call
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub model: String,
    pub key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockState {
    scripts: Arc<HashMap<String, ModelScript>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process mock of the generative language API
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    /// Start the mock with per-model scripts
    pub async fn start(scripts: Vec<(&str, ModelScript)>) -> Self {
        let scripts: HashMap<String, ModelScript> = scripts
            .into_iter()
            .map(|(model, script)| (model.to_string(), script))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = MockState {
            scripts: Arc::new(scripts),
            requests: requests.clone(),
        };

        let router = Router::new()
            .route("/v1beta/models/{call}", post(generate_content))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("Failed to get mock addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self { addr, requests }
    }

    /// Base URL to point the relay at (IMGD_UPSTREAM_URL)
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Models contacted so far, in order
    pub fn models_called(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }

    /// All observed requests
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Handle a scripted generateContent call
async fn generate_content(
    Path(call): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<MockState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    // The path segment arrives as "{model}:generateContent"
    let model = call
        .strip_suffix(":generateContent")
        .unwrap_or(&call)
        .to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        model: model.clone(),
        key: params.get("key").cloned(),
        body,
    });

    match state.scripts.get(&model) {
        Some(ModelScript::Image { data, mime_type }) => {
            let mut inline = json!({ "data": data });
            if let Some(mime) = mime_type {
                inline["mimeType"] = json!(mime);
            }
            Json(json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "generated" },
                    { "inlineData": inline }
                ]}}]
            }))
            .into_response()
        }
        Some(ModelScript::TextOnly) => Json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "no image here" }] } }]
        }))
        .into_response(),
        Some(ModelScript::Error { status, body }) => (
            StatusCode::from_u16(*status).expect("invalid scripted status"),
            body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, format!("unknown model: {}", model)).into_response(),
    }
}
