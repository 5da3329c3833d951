//! Error types for fwgate.

use crate::version::VersionError;
use std::path::PathBuf;
use thiserror::Error;

/// Broad failure class, used at the HTTP boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A config source is missing, malformed or incomplete (operator error).
    Configuration,
    /// An alias, device model or file does not exist.
    NotFound,
    /// A path resolved outside the storage root.
    Forbidden,
    /// A client-supplied version string could not be parsed.
    InvalidVersion,
    /// A file exists but could not be read (permissions, I/O failure).
    Io,
}

/// Errors that can occur while resolving a download.
#[derive(Debug, Error)]
pub enum GateError {
    /// A config document does not exist on disk.
    #[error("config source '{}' not found", path.display())]
    SourceMissing {
        /// Path of the missing document.
        path: PathBuf,
    },

    /// A config document could not be read or does not match its schema.
    #[error("config source '{}' is invalid: {reason}", path.display())]
    SourceInvalid {
        /// Path of the offending document.
        path: PathBuf,
        /// Parser or I/O message.
        reason: String,
    },

    /// An OTA policy record lacks a required field.
    #[error("incomplete OTA policy for device model '{device_model}': missing {field}")]
    IncompletePolicy {
        /// Model whose record is incomplete.
        device_model: String,
        /// Name of the missing or empty field.
        field: &'static str,
    },

    /// An OTA policy record carries an unparsable `latest_version`.
    #[error("OTA policy for device model '{device_model}' has an invalid latest_version: {source}")]
    InvalidPolicyVersion {
        /// Model whose record is broken.
        device_model: String,
        /// Underlying parse failure.
        #[source]
        source: VersionError,
    },

    /// The storage root directory cannot be resolved.
    #[error("storage root '{}' is unavailable", path.display())]
    StorageRootUnavailable {
        /// Configured storage root.
        path: PathBuf,
    },

    /// The alias is not in the mapping, or maps to an empty value.
    #[error("alias '{alias}' not found in mapping")]
    AliasNotFound {
        /// Requested alias.
        alias: String,
    },

    /// No OTA policy record exists for the device model.
    #[error("no OTA policy for device model '{device_model}'")]
    UnknownDeviceModel {
        /// Requested device model.
        device_model: String,
    },

    /// The target file does not exist (or is not a regular file).
    #[error("file '{filename}' not found on server")]
    FileNotFound {
        /// Filename as it appeared in the config document.
        filename: String,
    },

    /// The target exists but the filesystem refused or failed to read it.
    #[error("file '{filename}' could not be read: {source}")]
    FileUnreadable {
        /// Filename as it appeared in the config document.
        filename: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The target path escapes the storage root.
    #[error("access to '{filename}' is forbidden: path escapes the storage root")]
    PathEscapesRoot {
        /// Filename as it appeared in the config document.
        filename: String,
    },

    /// A client-supplied version string is malformed.
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),
}

impl GateError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceMissing { .. }
            | Self::SourceInvalid { .. }
            | Self::IncompletePolicy { .. }
            | Self::InvalidPolicyVersion { .. }
            | Self::StorageRootUnavailable { .. } => ErrorKind::Configuration,
            Self::AliasNotFound { .. }
            | Self::UnknownDeviceModel { .. }
            | Self::FileNotFound { .. } => ErrorKind::NotFound,
            Self::PathEscapesRoot { .. } => ErrorKind::Forbidden,
            Self::FileUnreadable { .. } => ErrorKind::Io,
            Self::InvalidVersion(_) => ErrorKind::InvalidVersion,
        }
    }
}

/// Result type alias for fwgate operations.
pub type Result<T> = std::result::Result<T, GateError>;
