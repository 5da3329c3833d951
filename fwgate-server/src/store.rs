//! Config Store: reads the alias mapping and OTA policy from disk.
//!
//! Nothing is cached. Each call re-reads its document, so operators can edit
//! `mapping.json` or `ota_config.json` in place and the next request sees the
//! change without a restart.

use fwgate_core::{AliasMapping, Decision, GateError, OtaPolicy};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Paths to the two JSON config documents.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    mapping_path: PathBuf,
    ota_config_path: PathBuf,
}

impl ConfigStore {
    /// Create a store for the given document paths.
    pub fn new(mapping_path: impl Into<PathBuf>, ota_config_path: impl Into<PathBuf>) -> Self {
        Self {
            mapping_path: mapping_path.into(),
            ota_config_path: ota_config_path.into(),
        }
    }

    /// Path of the alias mapping document.
    pub fn mapping_path(&self) -> &Path {
        &self.mapping_path
    }

    /// Path of the OTA policy document.
    pub fn ota_config_path(&self) -> &Path {
        &self.ota_config_path
    }

    /// Read and parse the alias mapping.
    pub async fn load_mapping(&self) -> Result<AliasMapping, GateError> {
        load_document(&self.mapping_path).await
    }

    /// Read and parse the OTA policy.
    pub async fn load_policy(&self) -> Result<OtaPolicy, GateError> {
        load_document(&self.ota_config_path).await
    }

    /// Resolve an alias to its filename against a fresh copy of the mapping.
    pub async fn resolve_alias(&self, alias: &str) -> Result<String, GateError> {
        let mapping = self.load_mapping().await?;
        mapping.resolve(alias).map(str::to_string)
    }

    /// Run the OTA decision against a fresh copy of the policy.
    pub async fn decide(
        &self,
        device_model: &str,
        current_version: &str,
    ) -> Result<Decision, GateError> {
        let policy = self.load_policy().await?;
        policy.decide(device_model, current_version)
    }
}

async fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, GateError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            GateError::SourceMissing {
                path: path.to_path_buf(),
            }
        } else {
            GateError::SourceInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    })?;

    serde_json::from_str(&text).map_err(|e| GateError::SourceInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
