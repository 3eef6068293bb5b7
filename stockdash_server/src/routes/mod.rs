pub mod market;

use std::path::Path;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use stockdash_lib::Dashboard;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::ApiError;

/// Assemble the full application: JSON API under `/api`, a health probe,
/// and the client build for everything else.
pub fn app(dashboard: Arc<Dashboard>, static_dir: &Path, cors_origin: Option<&str>) -> Router {
    let api = market::routes().fallback(api_not_found);

    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .fallback_service(spa)
        .layer(cors_layer(cors_origin))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(dashboard)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new().allow_origin(AllowOrigin::exact(origin)),
        None => {
            if let Some(o) = origin {
                tracing::warn!(origin = o, "unusable CORS origin, allowing any");
            }
            CorsLayer::permissive()
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound
}
