//! Health check endpoint.
//!
//! Reports whether the storage root and both config documents can be read
//! right now. Every request hits the filesystem; nothing is cached.

use crate::server::AppState;
use axum::http::StatusCode;
use axum::{Extension, Json};
use fwgate_core::GateError;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Health status response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// `ok` when every source is readable, `degraded` otherwise.
    pub status: &'static str,
    /// Server version.
    pub version: &'static str,
    /// Per-source results.
    pub checks: HealthChecks,
}

/// Readability of each source the routes depend on.
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    /// `mapping.json`.
    pub mapping: SourceCheck,
    /// `ota_config.json`.
    pub ota_config: SourceCheck,
    /// Storage root directory.
    pub static_dir: SourceCheck,
}

/// Outcome for one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceCheck {
    /// Whether the source could be read.
    pub ok: bool,
    /// Failure message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceCheck {
    fn from_result<T>(result: Result<T, GateError>) -> Self {
        match result {
            Ok(_) => Self { ok: true, error: None },
            Err(e) => Self {
                ok: false,
                error: Some(e.to_string()),
            },
        }
    }
}

impl HealthChecks {
    fn all_ok(&self) -> bool {
        self.mapping.ok && self.ota_config.ok && self.static_dir.ok
    }
}

/// Health check handler. 200 when healthy, 503 when any source is unreadable.
pub async fn health_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> (StatusCode, Json<HealthStatus>) {
    let (mapping, ota_config, static_dir) = tokio::join!(
        state.store.load_mapping(),
        state.store.load_policy(),
        storage_root(state.files.root()),
    );

    let checks = HealthChecks {
        mapping: SourceCheck::from_result(mapping),
        ota_config: SourceCheck::from_result(ota_config),
        static_dir: SourceCheck::from_result(static_dir),
    };

    let (code, status) = if checks.all_ok() {
        (StatusCode::OK, "ok")
    } else {
        tracing::warn!(?checks, "Health check degraded");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthStatus {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }),
    )
}

async fn storage_root(root: &Path) -> Result<(), GateError> {
    let unavailable = || GateError::StorageRootUnavailable {
        path: root.to_path_buf(),
    };

    // Listing proves the directory is readable, not just present.
    let mut entries = tokio::fs::read_dir(root).await.map_err(|_| unavailable())?;
    entries.next_entry().await.map_err(|_| unavailable())?;
    Ok(())
}
