//! # fwgate-core
//!
//! Pure logic for fwgate (no I/O, instant tests).
//!
//! fwgate is a narrow lookup-then-serve gate for embedded devices: a device
//! either downloads a file by a stable alias, or asks whether a newer firmware
//! image exists for its model. This crate holds every decision the server
//! makes, over documents that have already been read from disk:
//!
//! - [`AliasMapping`]: alias → filename lookup
//! - [`FirmwareVersion`]: semantic-version precedence
//! - [`OtaPolicy`]: per-model "latest firmware" records and the update decision
//! - [`containment`]: checks that keep served paths inside the storage root
//!
//! The actual I/O (reading JSON documents, canonicalizing paths, streaming
//! files) is performed by `fwgate-server`, which feeds its results into these
//! functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod containment;
pub mod error;
pub mod mapping;
pub mod policy;
pub mod version;

pub use error::{ErrorKind, GateError, Result};
pub use mapping::AliasMapping;
pub use policy::{Decision, OtaPolicy, PolicyRecord, ReleaseTarget};
pub use version::{compare, FirmwareVersion, VersionError};
