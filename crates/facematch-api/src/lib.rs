//! # facematch-api -- Face Match HTTP Service
//!
//! Verifies that an uploaded photo shows the person registered under an
//! identity number, by comparing it with the photo on file at the identity
//! service.
//!
//! ## API Surface
//!
//! | Route                   | Module                   | Purpose              |
//! |-------------------------|--------------------------|----------------------|
//! | `POST /facematch`       | [`routes::facematch`]    | Face comparison      |
//! | `GET /health/liveness`  | here                     | Process is up        |
//! | `GET /health/readiness` | here                     | Ready to serve       |
//! | `GET /health/metrics`   | here                     | Request counters     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod orchestration;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Json, Router};
use facematch_core::MAX_IMAGE_BYTES;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::{ApiMetrics, MetricsSnapshot};
use crate::state::AppState;

/// Transport limit for request bodies: the image cap plus room for the
/// multipart framing and the identity field, so a file just over the cap
/// still reaches the validator.
pub const BODY_LIMIT_BYTES: usize = MAX_IMAGE_BYTES as usize + 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics: ApiMetrics = state.metrics.clone();

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/health/metrics", get(metrics_snapshot));

    Router::new()
        .merge(routes::facematch::router())
        .merge(health)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe: always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the pipeline is wired at startup, so a running process
/// is ready.
async fn readiness() -> &'static str {
    "ready"
}

async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
