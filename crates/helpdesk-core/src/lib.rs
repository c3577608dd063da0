//! Core types and configuration for the helpdesk search simulator
//!
//! This crate provides:
//! - The loosely-typed record model (`Record`, `RecordKind`)
//! - In-memory collection snapshots loaded from JSON fixtures
//! - Configuration management (`Config`, environment parsing)
//! - Common error types

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod models;
pub mod snapshot;

// Re-export key types for convenience
pub use config::Config;
pub use error::{Error as CoreError, Result as CoreResult};
pub use models::{Record, RecordKind, UnknownKind, id_key, record_id};
pub use snapshot::{Collections, json_type_name};
