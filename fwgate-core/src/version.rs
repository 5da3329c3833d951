//! Firmware version precedence.
//!
//! Versions follow semantic-versioning precedence: the numeric core compares
//! component by component (so `2.0.1` > `1.10.0`, unlike a string compare),
//! a pre-release sorts before its release, and build metadata is ignored.
//!
//! Devices in the field often report `v1.2.3`; a single leading `v` and
//! surrounding whitespace are accepted. Anything short of a full
//! `MAJOR.MINOR.PATCH` core is rejected.

use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A version string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{input}': {reason}")]
pub struct VersionError {
    input: String,
    reason: String,
}

impl VersionError {
    /// The rejected input, as received.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A parsed firmware version.
///
/// Equality and ordering use precedence, so `1.0.0+a == 1.0.0+b`.
#[derive(Debug, Clone)]
pub struct FirmwareVersion(Version);

impl FirmwareVersion {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] naming the input if it is not a valid
    /// semantic version.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let bare = trimmed.strip_prefix(&['v', 'V'][..]).unwrap_or(trimmed);

        Version::parse(bare).map(Self).map_err(|e| VersionError {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }

    fn precedence_key(&self) -> (u64, u64, u64, &Prerelease) {
        (self.0.major, self.0.minor, self.0.patch, &self.0.pre)
    }
}

impl PartialEq for FirmwareVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FirmwareVersion {}

impl PartialOrd for FirmwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FirmwareVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // `Prerelease::EMPTY` sorts above every non-empty pre-release.
        self.precedence_key().cmp(&other.precedence_key())
    }
}

impl FromStr for FirmwareVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Compare two version strings by precedence.
///
/// # Errors
///
/// Fails on the first input that does not parse.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a = FirmwareVersion::parse(a)?;
    let b = FirmwareVersion::parse(b)?;
    Ok(a.cmp(&b))
}
