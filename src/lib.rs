//! nomad-conf - read, write, copy and diff Nomad variables.
//!
//! This library provides the core functionality for the `nomad-conf` CLI:
//! parsing variable references, diffing a key against local content,
//! copying variables or keys between paths, and uploading new values.

pub mod cert;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;

use storage::StoreError;

/// Library-level error type for nomad-conf operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed variable reference
    #[error("invalid variable spec {0}")]
    InvalidSpec(String),

    /// The operation needs `<variable>:<key>`
    #[error("variable {0}: must specify a key")]
    SpecNotKeyed(String),

    /// Whole variable on one side, single key on the other
    #[error("cannot copy {from} to {to}: both must name a key, or neither")]
    ShapeMismatch { from: String, to: String },

    #[error("variable {0} does not exist")]
    VariableNotFound(String),

    #[error("source variable {0} does not exist")]
    SourceNotFound(String),

    #[error("destination variable {0} does not exist")]
    DestinationMissing(String),

    #[error("key {key} not found in source variable {path}")]
    SourceKeyNotFound { path: String, key: String },

    #[error("key {key} not found in variable {path}")]
    KeyNotFound { path: String, key: String },

    /// A read failed for a reason other than absence (strict reads only)
    #[error("could not read variable {path}: {source}")]
    TransientRead {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for nomad-conf operations.
pub type Result<T> = std::result::Result<T, Error>;
