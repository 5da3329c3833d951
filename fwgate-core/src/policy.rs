//! Per-model OTA policy (`ota_config.json`) and the update decision.
//!
//! ```json
//! {
//!   "esp32-s3-generic": { "latest_version": "2.0.1", "filename": "fw_v2_0_1.bin" }
//! }
//! ```
//!
//! The schema accepts records with missing fields so that one broken model
//! does not take every other model down with it; completeness is checked
//! when a record is actually used.

use crate::error::{GateError, Result};
use crate::version::FirmwareVersion;
use serde::Deserialize;
use std::collections::HashMap;

/// One model's entry in the policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PolicyRecord {
    /// Newest firmware version available for the model.
    #[serde(default)]
    pub latest_version: Option<String>,
    /// File under the storage root holding that firmware.
    #[serde(default)]
    pub filename: Option<String>,
}

/// A complete, parsed policy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget<'a> {
    /// Parsed `latest_version`.
    pub latest_version: FirmwareVersion,
    /// Firmware filename, not yet checked against the filesystem.
    pub filename: &'a str,
}

impl PolicyRecord {
    /// Validate the record for `device_model`.
    ///
    /// # Errors
    ///
    /// [`GateError::IncompletePolicy`] if a field is missing or empty,
    /// [`GateError::InvalidPolicyVersion`] if `latest_version` does not parse.
    pub fn release(&self, device_model: &str) -> Result<ReleaseTarget<'_>> {
        let latest = required(&self.latest_version, device_model, "latest_version")?;
        let filename = required(&self.filename, device_model, "filename")?;

        let latest_version =
            FirmwareVersion::parse(latest).map_err(|source| GateError::InvalidPolicyVersion {
                device_model: device_model.to_string(),
                source,
            })?;

        Ok(ReleaseTarget {
            latest_version,
            filename,
        })
    }
}

fn required<'a>(
    field: &'a Option<String>,
    device_model: &str,
    name: &'static str,
) -> Result<&'a str> {
    match field.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GateError::IncompletePolicy {
            device_model: device_model.to_string(),
            field: name,
        }),
    }
}

/// Outcome of an OTA check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The device already runs the latest version (or newer).
    UpToDate {
        /// Configured latest version.
        latest_version: FirmwareVersion,
    },
    /// A newer firmware image should be served.
    UpdateAvailable {
        /// Configured latest version.
        latest_version: FirmwareVersion,
        /// Firmware file to serve.
        filename: String,
    },
}

/// Device model → policy record document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct OtaPolicy(HashMap<String, PolicyRecord>);

impl OtaPolicy {
    /// Parse a policy document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not an object of records.
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Get the record for a device model.
    pub fn record(&self, device_model: &str) -> Result<&PolicyRecord> {
        self.0
            .get(device_model)
            .ok_or_else(|| GateError::UnknownDeviceModel {
                device_model: device_model.to_string(),
            })
    }

    /// Decide whether a device running `current_version` needs an update.
    ///
    /// Equal versions count as up to date; only a strictly older
    /// `current_version` yields [`Decision::UpdateAvailable`].
    ///
    /// # Errors
    ///
    /// - [`GateError::UnknownDeviceModel`] if there is no record for the model
    /// - a configuration error if the record is incomplete or unparsable
    /// - [`GateError::InvalidVersion`] if `current_version` does not parse
    pub fn decide(&self, device_model: &str, current_version: &str) -> Result<Decision> {
        let release = self.record(device_model)?.release(device_model)?;
        let current = FirmwareVersion::parse(current_version)?;

        if current >= release.latest_version {
            Ok(Decision::UpToDate {
                latest_version: release.latest_version,
            })
        } else {
            Ok(Decision::UpdateAvailable {
                latest_version: release.latest_version,
                filename: release.filename.to_string(),
            })
        }
    }

    /// Iterate over every record.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PolicyRecord)> {
        self.0.iter().map(|(model, record)| (model.as_str(), record))
    }

    /// Number of device models in the document.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no records.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
