//! Alias → filename mapping (`mapping.json`).

use crate::error::{GateError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Flat alias → filename document.
///
/// A `null`, empty or whitespace-only value is accepted by the schema and
/// treated like a missing alias; any other non-string value makes the whole document invalid.
///
/// ```json
/// { "latest_firmware": "fw_v3.bin", "bootloader": "boot_v1.bin" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AliasMapping(HashMap<String, Option<String>>);

impl AliasMapping {
    /// Parse a mapping document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not an object of strings.
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Look up the filename for an alias.
    ///
    /// The filename is returned as written; it has not been checked against
    /// the filesystem.
    pub fn resolve(&self, alias: &str) -> Result<&str> {
        self.0
            .get(alias)
            .and_then(|target| target.as_deref())
            .filter(|filename| !filename.trim().is_empty())
            .ok_or_else(|| GateError::AliasNotFound {
                alias: alias.to_string(),
            })
    }

    /// Iterate over every entry, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(alias, target)| (alias.as_str(), target.as_deref()))
    }

    /// Number of aliases in the document.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no aliases.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AliasMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}
