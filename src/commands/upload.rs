//! Writing new content into a single key.

use super::{CommandResult, diff, read_required};
use crate::models::{Variable, VariableSpec};
use crate::storage::VariableStore;
use crate::{Error, Result};
use serde::Serialize;

/// Overwrite an existing key of an existing variable.
///
/// `put` never introduces new keys: the variable and the key must both
/// already exist. The rest of the variable's items are written back
/// unchanged.
pub fn put(store: &dyn VariableStore, spec: &VariableSpec, value: &str) -> Result<()> {
    if !spec.is_keyed() {
        return Err(Error::SpecNotKeyed(spec.path().to_string()));
    }

    let mut var = read_required(store, spec.path(), Error::VariableNotFound)?;

    match var.items.get_mut(spec.key()) {
        Some(slot) => *slot = value.to_string(),
        None => {
            return Err(Error::KeyNotFound {
                path: spec.path().to_string(),
                key: spec.key().to_string(),
            });
        }
    }

    store.update(&var)?;
    tracing::info!(spec = %spec, bytes = value.len(), "updated key");
    Ok(())
}

/// Create a variable holding exactly one key.
///
/// This replaces any variable already stored at the path, including its
/// other keys.
pub fn create(store: &dyn VariableStore, spec: &VariableSpec, value: &str) -> Result<()> {
    if !spec.is_keyed() {
        return Err(Error::SpecNotKeyed(spec.path().to_string()));
    }

    let var = Variable::new(spec.path()).with_item(spec.key(), value);
    store.create(&var)?;
    tracing::info!(spec = %spec, bytes = value.len(), "created variable");
    Ok(())
}

/// What `upload_if_changed` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Content matched the stored value and changes were required
    Skipped,
    /// Content was written; carries the diff that motivated it (may be empty)
    Uploaded { diff: String },
}

/// Diff first, then `put` unless nothing changed.
///
/// With `require_changes` set, identical content is a no-op. Without it the
/// value is written even when unchanged.
pub fn upload_if_changed(
    store: &dyn VariableStore,
    spec: &VariableSpec,
    content: &str,
    require_changes: bool,
) -> Result<UploadOutcome> {
    let diff = diff(store, spec, content)?;

    if diff.is_empty() && require_changes {
        tracing::info!(spec = %spec, "no changes detected, skipping upload");
        return Ok(UploadOutcome::Skipped);
    }

    put(store, spec, content)?;
    Ok(UploadOutcome::Uploaded { diff })
}

/// Kind of write performed by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Updated,
    Created,
    Skipped,
}

/// Result of `var put`, `var create` and `upload`.
#[derive(Serialize)]
pub struct WriteResult {
    pub spec: String,
    pub action: WriteAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl WriteResult {
    pub fn new(spec: &VariableSpec, action: WriteAction) -> Self {
        Self {
            spec: spec.to_string(),
            action,
            diff: None,
        }
    }

    pub fn from_upload(spec: &VariableSpec, outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Skipped => Self::new(spec, WriteAction::Skipped),
            UploadOutcome::Uploaded { diff } => Self {
                spec: spec.to_string(),
                action: WriteAction::Updated,
                diff: Some(diff),
            },
        }
    }
}

impl CommandResult for WriteResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match self.action {
            WriteAction::Skipped => "No changes detected, skipping upload\n".to_string(),
            WriteAction::Updated => format!("Updated {}\n", self.spec),
            WriteAction::Created => format!("Created {}\n", self.spec),
        }
    }
}
