//! Command implementations for nomad-conf.
//!
//! This module contains the business logic behind each CLI command:
//! - `diff` - Compare one key of a variable with candidate content
//! - `replace` - Copy a variable or a key onto another path
//! - `upload` - Put, create, and upload-if-changed
//! - `render` - Display helpers and listing
//! - `config` - Resolved settings report
//!
//! Every operation validates its inputs before the first write, so an error
//! returned from a validation step means the store was not modified.

pub mod config;
pub mod diff;
pub mod render;
pub mod replace;
pub mod upload;

pub use config::ConfigShow;
pub use diff::{DiffResult, LOCAL_LABEL, REMOTE_LABEL, diff};
pub use render::{RenderedVariable, VariableList, fetch, list, lookup, render};
pub use replace::{CopyResult, ReplaceOutcome, replace};
pub use upload::{UploadOutcome, WriteAction, WriteResult, create, put, upload_if_changed};

use crate::models::Variable;
use crate::storage::VariableStore;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Read a variable that must exist.
///
/// Not-found always maps through `missing`. Other read errors map through
/// `missing` too, with a warning logged, unless the store asks for strict
/// reads, in which case they surface as [`Error::TransientRead`].
pub(crate) fn read_required(
    store: &dyn VariableStore,
    path: &str,
    missing: impl FnOnce(String) -> Error,
) -> Result<Variable> {
    match store.read(path) {
        Ok(var) => Ok(var),
        Err(e) if e.is_not_found() => {
            tracing::debug!(path, "variable not found");
            Err(missing(path.to_string()))
        }
        Err(e) if !store.strict_reads() => {
            tracing::warn!(path, error = %e, "read failed, reporting variable as missing");
            Err(missing(path.to_string()))
        }
        Err(e) => Err(Error::TransientRead {
            path: path.to_string(),
            source: e,
        }),
    }
}

/// Read a variable that may legitimately be absent.
///
/// Returns `Ok(None)` for not-found (and, unless reads are strict, for any
/// other read error).
pub(crate) fn read_optional(store: &dyn VariableStore, path: &str) -> Result<Option<Variable>> {
    match store.read(path) {
        Ok(var) => Ok(Some(var)),
        Err(e) if e.is_not_found() => {
            tracing::debug!(path, "variable not found");
            Ok(None)
        }
        Err(e) if !store.strict_reads() => {
            tracing::warn!(path, error = %e, "read failed, treating variable as absent");
            Ok(None)
        }
        Err(e) => Err(Error::TransientRead {
            path: path.to_string(),
            source: e,
        }),
    }
}
