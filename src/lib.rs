//! # Dialect Classification API
//!
//! HTTP service for English dialect/accent classification of spoken audio.
//!
//! **Purpose:** Accept a video URL, download it with yt-dlp, extract the
//! audio track with ffmpeg, normalize the waveform to 16kHz mono, and run a
//! pretrained ONNX audio-classification model over it.
//!
//! **Architecture:** One linear pipeline per request
//! (download → extract → normalize → classify), with guard-scoped scratch
//! files and a model session loaded once at startup and shared read-only.

pub mod api;
pub mod audio;
pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;

pub use config::Config;
pub use error::PipelineError;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::classify::Classifier;

/// Application state shared across handlers
///
/// The classifier is loaded once at process start and shared read-only for
/// the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(config: Config, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            config: Arc::new(config),
            classifier,
        }
    }
}

/// Build application router
///
/// CORS is restricted to the configured frontend origins, with credentials
/// allowed (credentialed CORS forbids wildcard origins, so the allow-lists
/// are explicit).
pub fn build_router(state: AppState) -> Router {
    let cors = api::cors_layer(&state.config);

    Router::new()
        .route("/", get(api::handlers::welcome))
        .route("/health", get(api::handlers::health))
        .route("/classify_dialect/", post(api::handlers::classify_dialect))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
