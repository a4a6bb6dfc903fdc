//! Diff one key of a remote variable against candidate content.

use super::{CommandResult, read_required};
use crate::models::VariableSpec;
use crate::storage::VariableStore;
use crate::{Error, Result};
use serde::Serialize;
use similar::TextDiff;

/// Label for the stored side of a diff.
pub const REMOTE_LABEL: &str = "nomad";

/// Label for the candidate side of a diff.
pub const LOCAL_LABEL: &str = "local";

/// Lines of context around each hunk.
const CONTEXT_LINES: usize = 3;

/// Compute a unified diff between the stored value of `spec` and `candidate`.
///
/// Returns an empty string when the two are byte-for-byte identical. A key
/// missing from the variable compares as the empty string.
///
/// # Errors
/// - [`Error::SpecNotKeyed`] if `spec` names a whole variable
/// - [`Error::VariableNotFound`] if the variable cannot be read
pub fn diff(store: &dyn VariableStore, spec: &VariableSpec, candidate: &str) -> Result<String> {
    if !spec.is_keyed() {
        return Err(Error::SpecNotKeyed(spec.path().to_string()));
    }

    let var = read_required(store, spec.path(), Error::VariableNotFound)?;
    let stored = var.get(spec.key()).unwrap_or_default();

    if stored == candidate {
        return Ok(String::new());
    }

    Ok(unified_diff(stored, candidate))
}

/// Render a unified diff with the remote value as the old side.
fn unified_diff(remote: &str, local: &str) -> String {
    let text_diff = TextDiff::from_lines(remote, local);
    let mut unified = text_diff.unified_diff();
    unified
        .context_radius(CONTEXT_LINES)
        .header(REMOTE_LABEL, LOCAL_LABEL);
    unified.to_string()
}

/// Result of the `diff` command.
#[derive(Serialize)]
pub struct DiffResult {
    pub spec: String,
    pub changed: bool,
    pub diff: String,
}

impl DiffResult {
    pub fn new(spec: &VariableSpec, diff: String) -> Self {
        Self {
            spec: spec.to_string(),
            changed: !diff.is_empty(),
            diff,
        }
    }
}

impl CommandResult for DiffResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.diff.is_empty() {
            "No differences found\n".to_string()
        } else if self.diff.ends_with('\n') {
            self.diff.clone()
        } else {
            format!("{}\n", self.diff)
        }
    }
}
