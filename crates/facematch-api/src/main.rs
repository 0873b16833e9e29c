//! # facematch-api -- Binary Entry Point
//!
//! Starts the Axum HTTP server for the face match service.
//! Binds to a configurable port (default 8000).

use std::sync::Arc;

use facematch_api::state::{AppConfig, AppState};
use facematch_face::FaceEncoder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration invalid: {e}");
        e
    })?;
    tracing::info!(
        token_url = %config.identity.token_url,
        photo_lookup_url = %config.identity.photo_lookup_url,
        timeout_secs = config.identity.timeout_secs,
        tolerance = config.tolerance,
        "configuration loaded"
    );

    let encoder = load_encoder().map_err(|e| {
        tracing::error!("Face encoder unavailable: {e}");
        e
    })?;

    let state = AppState::from_config(&config, encoder).map_err(|e| {
        tracing::error!("Failed to create identity service client: {e}");
        e
    })?;

    let app = facematch_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("facematch API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "dlib")]
fn load_encoder() -> Result<Arc<dyn FaceEncoder>, Box<dyn std::error::Error>> {
    use facematch_face::dlib::{worker_count, DlibEncoder, ModelPaths};

    let models = ModelPaths::from_env()?;
    let workers = worker_count(|key| std::env::var(key).ok())?;
    let encoder = tokio::task::block_in_place(|| DlibEncoder::load(&models, 0, workers))?;
    Ok(Arc::new(encoder))
}

#[cfg(not(feature = "dlib"))]
fn load_encoder() -> Result<Arc<dyn FaceEncoder>, Box<dyn std::error::Error>> {
    Err("built without a face encoder; rebuild with `--features dlib`".into())
}
