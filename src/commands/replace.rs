//! Copy a whole variable, or one key, onto another path.

use super::{CommandResult, read_optional, read_required};
use crate::models::{Variable, VariableSpec};
use crate::storage::VariableStore;
use crate::{Error, Result};
use serde::Serialize;

/// How the destination was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplaceOutcome {
    /// The destination did not exist and was created
    Created,
    /// The destination existed and was updated
    Updated,
}

/// Copy `from` onto `to`.
///
/// Both specs must be keyed or both bare. A keyed copy writes the source
/// value into the destination under the *source's* key name; the
/// destination spec's key name is only used for the shape check. A bare copy
/// replaces the destination's items wholesale.
///
/// A missing destination is created when `allow_create` is set.
///
/// # Errors
/// - [`Error::ShapeMismatch`] before any store call if the shapes differ
/// - [`Error::SourceNotFound`] if the source variable cannot be read
/// - [`Error::DestinationMissing`] if the destination is absent and creation is off
/// - [`Error::SourceKeyNotFound`] if the source key is absent
/// - [`Error::Store`] if the final write fails
pub fn replace(
    store: &dyn VariableStore,
    from: &VariableSpec,
    to: &VariableSpec,
    allow_create: bool,
) -> Result<ReplaceOutcome> {
    if from.is_keyed() != to.is_keyed() {
        return Err(Error::ShapeMismatch {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let source = read_required(store, from.path(), Error::SourceNotFound)?;

    let (mut dest, outcome) = match read_optional(store, to.path())? {
        Some(var) => (var, ReplaceOutcome::Updated),
        None if allow_create => (Variable::new(to.path()), ReplaceOutcome::Created),
        None => return Err(Error::DestinationMissing(to.path().to_string())),
    };

    if from.is_keyed() {
        let value = source
            .get(from.key())
            .ok_or_else(|| Error::SourceKeyNotFound {
                path: from.path().to_string(),
                key: from.key().to_string(),
            })?;
        dest.items.insert(from.key().to_string(), value.to_string());
    } else {
        dest.items = source.items.clone();
    }

    match outcome {
        ReplaceOutcome::Created => store.create(&dest)?,
        ReplaceOutcome::Updated => store.update(&dest)?,
    }

    tracing::info!(from = %from, to = %to, ?outcome, "copied variable");
    Ok(outcome)
}

/// Result of the `cp` command.
#[derive(Serialize)]
pub struct CopyResult {
    pub from: String,
    pub to: String,
    pub outcome: ReplaceOutcome,
}

impl CopyResult {
    pub fn new(from: &VariableSpec, to: &VariableSpec, outcome: ReplaceOutcome) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            outcome,
        }
    }
}

impl CommandResult for CopyResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let verb = match self.outcome {
            ReplaceOutcome::Created => "created",
            ReplaceOutcome::Updated => "updated",
        };
        format!("Copied {} to {} ({})\n", self.from, self.to, verb)
    }
}
