//! Store backend trait and backend selection.
//!
//! This module provides different backends for variable storage:
//! - `NomadBackend` - Nomad HTTP API (default)
//! - `FileBackend` - Local JSON document, for offline use and tests
//! - `MemoryBackend` - In-process map with call counters

use super::StoreResult;
use crate::models::{Variable, VariableMetadata};

/// Address prefix selecting the file backend.
pub const FILE_SCHEME: &str = "file://";

/// Trait for stores that hold variables.
///
/// Each call is a single blocking round trip and is atomic for one variable.
/// Nothing here is atomic across calls: a read followed by an update can lose
/// a concurrent writer's change unless check-and-set is enabled.
pub trait VariableStore {
    /// List all variables known to the store, in store order.
    fn list(&self) -> StoreResult<Vec<VariableMetadata>>;

    /// Read a variable by path. Fails with `StoreError::NotFound` if absent.
    fn read(&self, path: &str) -> StoreResult<Variable>;

    /// Create a variable, replacing any existing one at the same path.
    fn create(&self, variable: &Variable) -> StoreResult<()>;

    /// Replace the items of an existing variable.
    fn update(&self, variable: &Variable) -> StoreResult<()>;

    /// Whether read failures other than not-found should be reported as such
    /// instead of being folded into "does not exist".
    fn strict_reads(&self) -> bool {
        false
    }

    /// Get the store location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> &'static str;
}

impl<S: VariableStore + ?Sized> VariableStore for &S {
    fn list(&self) -> StoreResult<Vec<VariableMetadata>> {
        (**self).list()
    }

    fn read(&self, path: &str) -> StoreResult<Variable> {
        (**self).read(path)
    }

    fn create(&self, variable: &Variable) -> StoreResult<()> {
        (**self).create(variable)
    }

    fn update(&self, variable: &Variable) -> StoreResult<()> {
        (**self).update(variable)
    }

    fn strict_reads(&self) -> bool {
        (**self).strict_reads()
    }

    fn location(&self) -> String {
        (**self).location()
    }

    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }
}

/// Available backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Nomad HTTP API
    Nomad,
    /// Local JSON file
    File,
}

impl BackendType {
    /// Pick a backend from a server address.
    ///
    /// `file://<dir>` selects the file backend, anything else is treated as
    /// a Nomad HTTP address.
    pub fn from_address(address: &str) -> Self {
        if address.starts_with(FILE_SCHEME) {
            Self::File
        } else {
            Self::Nomad
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nomad => "nomad",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
