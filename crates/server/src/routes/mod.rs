//! HTTP routes for the catalog server.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness check
//! GET    /health/ready        - Readiness check (active store answers)
//!
//! # Admin page
//! GET    /                    - Product table with add/edit/delete
//!
//! # Products API
//! GET    /products            - List products
//! POST   /products            - Create product (JSON, form or multipart)
//! GET    /products/{id}       - Show product
//! PUT    /products/{id}       - Replace product
//! PATCH  /products/{id}       - Update supplied fields
//! DELETE /products/{id}       - Delete product
//!
//! # Files
//! GET    /uploads/*           - Uploaded images
//! GET    /static/*            - Admin page assets
//! ```

pub mod form;
pub mod products;
pub mod ui;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the application router with tracing and request IDs applied.
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads().dir());
    let assets = ServeDir::new(&state.config().static_dir);
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/", get(ui::index))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::replace)
                .patch(products::patch)
                .delete(products::delete),
        )
        .nest_service("/uploads", uploads)
        .nest_service("/static", assets)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the active store does not answer.
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let source = state.source();
    if state.data_source().is_ready().await {
        (StatusCode::OK, Json(json!({ "status": "ok", "source": source })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "source": source })),
        )
    }
}

/// Fallback-mode state over a temporary public directory.
#[cfg(test)]
pub(crate) async fn test_state() -> (AppState, tempfile::TempDir) {
    use crate::config::CatalogConfig;
    use crate::services::{DataSource, UploadStore};

    let dir = tempfile::TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let config = CatalogConfig {
        public_dir: dir.path().to_path_buf(),
        hostname: "test-host".to_string(),
        ..CatalogConfig::default()
    };
    let uploads = UploadStore::open(config.uploads_dir())
        .await
        .unwrap_or_else(|e| panic!("uploads dir: {e}"));
    let mut data_source = DataSource::new(None, uploads.clone());
    data_source.initialize(false).await;

    (AppState::new(config, data_source, uploads), dir)
}
