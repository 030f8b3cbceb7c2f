//! Google Generative Language API integration
//!
//! Provides:
//! - Image generation via `generateContent`
//! - Ordered fallback across candidate models: each model is tried in turn
//!   and the first success-status response is accepted
//! - Extraction of the first inline image from an accepted response

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Upstream error bodies are truncated to this many characters before they
/// are recorded, so exhaustion reports stay bounded.
const ERROR_BODY_LIMIT: usize = 200;

/// MIME type assumed when the upstream omits one on an inline part
const DEFAULT_MIME_TYPE: &str = "image/png";

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("GEMINI_API_KEY not configured")]
    NotConfigured,

    #[error("All models failed. Last: {0}")]
    AllModelsFailed(String),

    #[error("No image in response")]
    NoImage,
}

/// A generated image extracted from an upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Base64 payload, passed through exactly as the upstream returned it
    pub data: String,
    pub mime_type: String,
}

/// generateContent request body
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

/// Request part: inline image data or prompt text, never both
#[derive(Debug, Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<RequestInlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct RequestInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
}

impl GenerateContentRequest {
    /// Build the relay request: inline image first, prompt text second, with
    /// both response modalities requested.
    fn new(image_data: &str, prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        inline_data: Some(RequestInlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: image_data.to_string(),
                        }),
                        text: None,
                    },
                    RequestPart {
                        inline_data: None,
                        text: Some(prompt.to_string()),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

/// generateContent response body
///
/// Every traversal step is optional; a response missing any of it is simply
/// one that contains no image.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

/// Generative language API client
#[derive(Debug)]
pub struct GeminiClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: Option<String>,
    /// API base URL
    base_url: String,
    /// Candidate models, in preference order
    models: Vec<String>,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .unwrap(),
            api_key: config.api_key.clone(),
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
            models: config.models.clone(),
        }
    }

    /// Check if the API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate an image from an input image and a prompt
    ///
    /// Tries each candidate model in order, accepts the first response with a
    /// success status, and extracts the first inline image part from it. The
    /// last failure is carried forward and surfaced only if every model fails.
    pub async fn generate(
        &self,
        image_data: &str,
        prompt: &str,
    ) -> Result<GeneratedImage, GenerateError> {
        let api_key = self.api_key.as_ref().ok_or(GenerateError::NotConfigured)?;

        let request = GenerateContentRequest::new(image_data, prompt);
        let mut last_error: Option<String> = None;
        let mut accepted: Option<GenerateContentResponse> = None;

        for model in &self.models {
            debug!("Attempting generation with model {}", model);

            let url = format!("{}/models/{}:generateContent", self.base_url, model);
            let result = self
                .client
                .post(&url)
                .query(&[("key", api_key.as_str())])
                .json(&request)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    // The key travels as a query parameter; strip the URL
                    // from the fault before it can reach logs or callers.
                    let detail = format!("{}: {}", model, e.without_url());
                    warn!("Model failed: {}", detail);
                    last_error = Some(detail);
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                let detail = format!(
                    "{}: {} - {}",
                    model,
                    status,
                    truncate(&body, ERROR_BODY_LIMIT)
                );
                warn!("Model failed: {}", detail);
                last_error = Some(detail);
                continue;
            }

            match response.json::<GenerateContentResponse>().await {
                Ok(parsed) => {
                    accepted = Some(parsed);
                    break;
                }
                Err(e) => {
                    let detail = format!("{}: {}", model, e.without_url());
                    warn!("Model failed: {}", detail);
                    last_error = Some(detail);
                }
            }
        }

        let response = match accepted {
            Some(response) => response,
            None => {
                let last = last_error.unwrap_or_else(|| "no models configured".to_string());
                return Err(GenerateError::AllModelsFailed(last));
            }
        };

        extract_image(response).ok_or(GenerateError::NoImage)
    }
}

/// Truncate a string to at most `limit` characters
fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Extract the first non-empty inline image from an accepted response
///
/// Only the first candidate is inspected. Its parts are walked in upstream
/// order; the MIME type defaults to PNG when omitted.
fn extract_image(response: GenerateContentResponse) -> Option<GeneratedImage> {
    let candidate = response.candidates.into_iter().next()?;
    let content = candidate.content?;

    for part in content.parts {
        if let Some(inline) = part.inline_data {
            if !inline.data.is_empty() {
                return Some(GeneratedImage {
                    data: inline.data,
                    mime_type: inline
                        .mime_type
                        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
                });
            }
        }
    }

    None
}
