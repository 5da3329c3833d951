//! HTTP endpoints for fwgate.
//!
//! - `GET /request_file/:alias`: download a file by alias
//! - `GET /ota?device_model=..&current_version=..`: firmware update check
//! - `GET /`: informational JSON
//! - `GET /health`: readability of the storage root and config documents

mod download;
mod health;
pub mod ota;

use crate::server::AppState;
use axum::{routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub use ota::FIRMWARE_VERSION_HEADER;

/// Build the HTTP router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health::health_handler))
        .route("/request_file/:alias", get(download::request_file_handler))
        .route("/ota", get(ota::ota_handler))
        .layer(Extension(state))
}

/// Informational root endpoint.
async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the fwgate file server. \
                    Visit /request_file/<alias> to download a file.",
        "routes": [
            "GET /request_file/{alias}",
            "GET /ota?device_model={model}&current_version={version}",
            "GET /health",
        ],
    }))
}
