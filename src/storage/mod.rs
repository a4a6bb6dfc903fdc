//! Storage layer: the adapters that hold variables.
//!
//! ## Store Backends
//!
//! - **Nomad backend** (default): the Nomad HTTP API (`/v1/vars`, `/v1/var/<path>`)
//! - **File backend**: a single JSON document under a local directory,
//!   addressed as `file://<dir>`
//! - **Memory backend**: an in-process map that counts reads and writes
//!
//! All backends expose the same four operations (list, read, create,
//! update) through [`VariableStore`]. Connection details are passed in a
//! [`StoreConfig`]; nothing here reads process-wide state.

pub mod backend;
pub mod file;
pub mod memory;
pub mod nomad;

pub use backend::{BackendType, FILE_SCHEME, VariableStore};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use nomad::NomadBackend;

use std::time::Duration;
use thiserror::Error;

/// Default Nomad API address.
pub const DEFAULT_ADDRESS: &str = "http://localhost:4646";

/// Default Nomad namespace.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No variable exists at the path
    #[error("variable {0} not found")]
    NotFound(String),

    /// Credential missing or lacking permission (401/403)
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Check-and-set update lost a race
    #[error("variable {path} was modified concurrently (expected index {expected})")]
    Conflict { path: String, expected: u64 },

    /// Unexpected HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response or document could not be decoded
    #[error("failed to parse store response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error means the variable is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Connection settings handed to a backend at construction time.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Server address (`http(s)://...` or `file://<dir>`)
    pub address: String,
    /// Bearer credential, passed through untouched
    pub token: Option<String>,
    /// Nomad namespace
    pub namespace: String,
    /// Send the read `modify_index` with updates (check-and-set)
    pub check_index: bool,
    /// Report read errors other than not-found instead of folding them in
    pub strict_not_found: bool,
    /// Transport timeout for HTTP backends
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            check_index: false,
            strict_not_found: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Create a config for the given address with defaults elsewhere.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Which backend this address selects.
    pub fn backend_type(&self) -> BackendType {
        BackendType::from_address(&self.address)
    }
}

/// Open the backend selected by `config.address`.
pub fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn VariableStore>> {
    let store: Box<dyn VariableStore> = match config.backend_type() {
        BackendType::Nomad => Box::new(NomadBackend::new(config)),
        BackendType::File => Box::new(FileBackend::open(config)?),
    };
    tracing::debug!(
        backend = store.backend_type(),
        location = %store.location(),
        "opened variable store"
    );
    Ok(store)
}
