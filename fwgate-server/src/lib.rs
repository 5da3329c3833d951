//! # fwgate-server
//!
//! HTTP gate that serves files to embedded devices by stable alias, and
//! firmware images over the air when a device reports an outdated version.
//!
//! ## Architecture
//!
//! ```text
//!   device ──GET /request_file/:alias──┐
//!   device ──GET /ota?device_model&..──┤
//!                                      ▼
//!                  ┌──────────── fwgate-server ────────────┐
//!                  │ ConfigStore ──► fwgate-core decisions │
//!                  │     │                    │            │
//!                  │ mapping.json       StaticFiles ──────►│── octet-stream
//!                  │ ota_config.json    (containment)      │
//!                  └───────────────────────────────────────┘
//! ```
//!
//! Config documents are re-read on every request; nothing is cached and no
//! in-process state is mutated after startup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod check;
pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod server;
pub mod store;
