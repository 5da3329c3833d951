//! Alias download endpoint and the shared file response builder.

use crate::error::{ApiError, ApiResult};
use crate::files::ServedFile;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::Path;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `GET /request_file/:alias`
pub async fn request_file_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(alias): Path<String>,
) -> ApiResult<Response> {
    let filename = state.store.resolve_alias(&alias).await?;
    tracing::info!(alias = %alias, filename = %filename, "Alias resolved");

    let served = state.files.open(&filename).await?;
    tracing::info!(filename = %filename, bytes = served.len, "Sending file");

    file_response(served)
}

/// Stream `served` as a full-body `application/octet-stream` download.
pub(crate) fn file_response(served: ServedFile) -> ApiResult<Response> {
    let disposition = content_disposition(&served.download_name);
    let disposition =
        HeaderValue::from_str(&disposition).map_err(|e| ApiError::Internal(e.to_string()))?;

    let headers = [
        (
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (CONTENT_DISPOSITION, disposition),
        (CONTENT_LENGTH, HeaderValue::from(served.len)),
    ];

    let body = Body::from_stream(ReaderStream::new(served.file));
    Ok((StatusCode::OK, headers, body).into_response())
}

/// `attachment` disposition carrying `name`.
///
/// Names that pass [`header_safe`] unchanged get a plain `filename`. Anything
/// else also gets an RFC 5987 `filename*` carrying the exact UTF-8 name.
fn content_disposition(name: &str) -> String {
    let fallback = header_safe(name);
    if fallback == name {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(name, ATTR_CHAR)
        )
    }
}

/// Replace anything that cannot sit inside a quoted header parameter.
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
