//! # WasteWise Common
//!
//! Pieces both service binaries need at startup and at the HTTP edge:
//!
//! - [`config`]: environment lookup and the settings every service shares
//! - [`telemetry`]: tracing subscriber setup
//! - [`status`]: the one place a [`DomainError`](wastewise_domain::DomainError)
//!   becomes an HTTP status and an error envelope

pub mod config;
pub mod status;
pub mod telemetry;

pub use config::{Env, LogFormat, SequenceMode, SharedConfig, StorageBackend};
pub use status::{client_message, status_for, ApiError};
pub use telemetry::init_tracing;
