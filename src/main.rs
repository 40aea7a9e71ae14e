//! dialect-api - Main entry point
//!
//! Starts the HTTP server for the English dialect classification service:
//! loads the ONNX classification model once, then serves the classification
//! pipeline endpoint until shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dialect_api::classify::OnnxClassifier;
use dialect_api::pipeline::fetch::VideoFetcher;
use dialect_api::{build_router, AppState, Config};

/// Command-line arguments for dialect-api
#[derive(Parser, Debug)]
#[command(name = "dialect-api")]
#[command(about = "English dialect classification API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "DIALECT_API_PORT")]
    port: Option<u16>,

    /// Path to TOML configuration file
    #[arg(short, long, env = "DIALECT_API_CONFIG")]
    config: Option<PathBuf>,

    /// Directory containing model.onnx and labels.json
    #[arg(short, long, env = "DIALECT_API_MODEL_DIR")]
    model_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dialect_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Config file (if any), then command-line/env overrides on top
    let mut config = Config::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(model_dir) = args.model_dir {
        config.model_dir = model_dir;
    }

    info!("Starting dialect-api on port {}", config.port);
    info!("Model directory: {}", config.model_dir.display());
    info!("Scratch directory: {}", config.scratch_dir.display());

    // Load the classification model once; it is shared read-only across
    // all requests for the lifetime of the process.
    let classifier = OnnxClassifier::load(config.model_dir.clone())
        .await
        .context("Failed to load classification model")?;
    info!("Classification model loaded");

    // A missing download tool is not fatal at startup; requests that need it
    // degrade to an error response.
    if !VideoFetcher::new(&config).is_available() {
        warn!(
            "{} not found on this host; download requests will fail",
            config.yt_dlp_path
        );
    }

    let state = AppState::new(config.clone(), classifier);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
