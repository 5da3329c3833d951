//! Safe File Responder: opens files strictly inside the storage root.
//!
//! Order of checks for a requested `filename`:
//!
//! 1. lexical traversal check on the filename (403)
//! 2. canonicalize the storage root (500 if it does not exist)
//! 3. canonicalize `root/filename` (404 if it does not exist)
//! 4. canonical containment check, which catches symlinks pointing out (403)
//! 5. regular-file check (404)
//!
//! Only "does not exist" style I/O failures become 404. Permission and device
//! errors on a path under the root are reported as unreadable (500).

use fwgate_core::containment::{is_contained, stays_within};
use fwgate_core::GateError;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// An opened file that passed every containment check.
#[derive(Debug)]
pub struct ServedFile {
    /// Open handle positioned at the start of the file.
    pub file: File,
    /// Size in bytes.
    pub len: u64,
    /// Name to advertise in `Content-Disposition`.
    pub download_name: String,
}

/// The storage root all downloads are served from.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Create a responder for `root`. The directory is resolved per request.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured (uncanonicalized) storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `filename` to a canonical path inside the root.
    ///
    /// # Errors
    ///
    /// - [`GateError::PathEscapesRoot`] if the path leaves the root
    /// - [`GateError::StorageRootUnavailable`] if the root cannot be resolved
    /// - [`GateError::FileNotFound`] if the target is missing or not a regular file
    /// - [`GateError::FileUnreadable`] for any other I/O failure on the target
    pub async fn locate(&self, filename: &str) -> Result<PathBuf, GateError> {
        if !stays_within(Path::new(filename)) {
            return Err(escapes(filename));
        }

        let root = tokio::fs::canonicalize(&self.root).await.map_err(|_| {
            GateError::StorageRootUnavailable {
                path: self.root.clone(),
            }
        })?;

        let candidate = tokio::fs::canonicalize(root.join(filename))
            .await
            .map_err(|e| classify(filename, e))?;

        if !is_contained(&root, &candidate) {
            tracing::warn!(
                filename,
                resolved = %candidate.display(),
                root = %root.display(),
                "Rejected path outside storage root"
            );
            return Err(escapes(filename));
        }

        let metadata = tokio::fs::metadata(&candidate)
            .await
            .map_err(|e| classify(filename, e))?;
        if !metadata.is_file() {
            return Err(not_found(filename));
        }

        Ok(candidate)
    }

    /// Locate and open `filename` for a full-body download.
    pub async fn open(&self, filename: &str) -> Result<ServedFile, GateError> {
        let path = self.locate(filename).await?;

        let file = File::open(&path)
            .await
            .map_err(|e| classify(filename, e))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| classify(filename, e))?
            .len();

        Ok(ServedFile {
            file,
            len,
            download_name: download_name(filename),
        })
    }
}

fn escapes(filename: &str) -> GateError {
    GateError::PathEscapesRoot {
        filename: filename.to_string(),
    }
}

fn not_found(filename: &str) -> GateError {
    GateError::FileNotFound {
        filename: filename.to_string(),
    }
}

/// Map an I/O failure on `filename` to 404 only when nothing is there.
///
/// Dangling symlinks surface as `NotFound`; a path component that is a file
/// surfaces as `NotADirectory`.
fn classify(filename: &str, err: io::Error) -> GateError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => not_found(filename),
        _ => GateError::FileUnreadable {
            filename: filename.to_string(),
            source: err,
        },
    }
}

/// Final path component of `filename`, for the download header.
fn download_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}
