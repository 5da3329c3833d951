//! OTA check endpoint.

use super::download::file_response;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use fwgate_core::Decision;
use serde::Deserialize;
use std::sync::Arc;

/// Header carrying the version of the firmware in a 200 response.
pub const FIRMWARE_VERSION_HEADER: &str = "x-firmware-version";

/// Query string of `GET /ota`. Both parameters are required.
#[derive(Debug, Clone, Deserialize)]
pub struct OtaQuery {
    /// Device model, the key into `ota_config.json`.
    pub device_model: String,
    /// Version the device currently runs.
    pub current_version: String,
}

/// `GET /ota?device_model=..&current_version=..`
///
/// - 200 with the firmware image if a newer version exists
/// - 304 with an empty body if the device is current
pub async fn ota_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<OtaQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let decision = state
        .store
        .decide(&query.device_model, &query.current_version)
        .await?;

    match decision {
        Decision::UpToDate { latest_version } => {
            tracing::info!(
                device_model = %query.device_model,
                current_version = %query.current_version,
                latest_version = %latest_version,
                "Device is up to date"
            );
            Ok(StatusCode::NOT_MODIFIED.into_response())
        }
        Decision::UpdateAvailable {
            latest_version,
            filename,
        } => {
            let served = state.files.open(&filename).await?;
            tracing::info!(
                device_model = %query.device_model,
                current_version = %query.current_version,
                latest_version = %latest_version,
                filename = %filename,
                bytes = served.len,
                "Sending firmware update"
            );

            let version = HeaderValue::from_str(&latest_version.to_string())
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            let mut response = file_response(served)?;
            response
                .headers_mut()
                .insert(HeaderName::from_static(FIRMWARE_VERSION_HEADER), version);
            Ok(response)
        }
    }
}
