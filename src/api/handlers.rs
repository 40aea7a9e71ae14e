//! HTTP request handlers
//!
//! The classification endpoint reports pipeline failures in the response
//! body as an `error` field (HTTP 200), matching the service contract; only
//! URL validation rejects with a non-200 status.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

use crate::classify::Prediction;
use crate::pipeline;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub url: String,
}

/// Body of a classification response: either ranked results or an error
/// message, never both.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ClassifyResponse {
    Results { results: Vec<Prediction> },
    Error { error: String },
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Static welcome message
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the English Dialect Classification API!".to_string(),
    })
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "dialect_api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /classify_dialect/ - Run the classification pipeline for a video URL
pub async fn classify_dialect(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Response {
    let url = match parse_http_url(&req.url) {
        Ok(url) => url,
        Err(reason) => {
            info!("Rejected URL {:?}: {reason}", req.url);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ClassifyResponse::Error {
                    error: "Invalid URL.".to_string(),
                }),
            )
                .into_response();
        }
    };

    info!("Received URL: {url}");

    match pipeline::classify_url(&state.config, Arc::clone(&state.classifier), &url).await {
        Ok(results) => Json(ClassifyResponse::Results { results }).into_response(),
        Err(e) => {
            error!("Pipeline failed for {url}: {e}");
            Json(ClassifyResponse::Error {
                error: e.user_message(),
            })
            .into_response()
        }
    }
}

/// Parse and type-check the request URL. Only absolute http/https URLs are
/// accepted.
fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_and_https_urls_accepted() {
        assert!(parse_http_url("http://example.com/video.mp4").is_ok());
        assert!(parse_http_url("https://www.youtube.com/watch?v=abc123").is_ok());
    }

    #[test]
    fn malformed_url_rejected() {
        assert!(parse_http_url("not a url").is_err());
        assert!(parse_http_url("").is_err());
    }

    #[test]
    fn non_http_scheme_rejected() {
        assert!(parse_http_url("ftp://example.com/video.mp4").is_err());
        assert!(parse_http_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn classify_response_serializes_to_contract_shape() {
        let body = serde_json::to_value(ClassifyResponse::Results {
            results: vec![Prediction {
                label: "england".to_string(),
                score: 0.82,
            }],
        })
        .unwrap();
        assert_eq!(body["results"][0]["label"], "england");

        let body = serde_json::to_value(ClassifyResponse::Error {
            error: "Failed to download the video.".to_string(),
        })
        .unwrap();
        assert_eq!(body["error"], "Failed to download the video.");
        assert!(body.get("results").is_none());
    }
}
