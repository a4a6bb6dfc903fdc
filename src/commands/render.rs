//! Display helpers for variables.

use super::{CommandResult, read_required};
use crate::models::{Items, Variable, VariableSpec};
use crate::storage::VariableStore;
use crate::{Error, Result};
use serde::Serialize;

/// Format a variable for display.
///
/// For a keyed spec this is the raw value, or `""` when the key is absent
/// (use [`lookup`] to tell the two apart). For a bare spec it is one
/// `key = value` line per item.
pub fn render(variable: &Variable, spec: &VariableSpec) -> String {
    if spec.is_keyed() {
        return lookup(variable, spec).unwrap_or_default().to_string();
    }

    variable
        .items
        .iter()
        .map(|(k, v)| format!("{} = {}\n", k, v))
        .collect()
}

/// The value a keyed spec points at, if present.
///
/// Always `None` for a bare spec.
pub fn lookup<'a>(variable: &'a Variable, spec: &VariableSpec) -> Option<&'a str> {
    if !spec.is_keyed() {
        return None;
    }
    variable.get(spec.key())
}

/// Read the variable a spec refers to.
pub fn fetch(store: &dyn VariableStore, spec: &VariableSpec) -> Result<Variable> {
    read_required(store, spec.path(), Error::VariableNotFound)
}

/// All variable paths, in store order.
pub fn list(store: &dyn VariableStore) -> Result<Vec<String>> {
    Ok(store.list()?.into_iter().map(|meta| meta.path).collect())
}

/// Result of `var get` with no arguments.
#[derive(Serialize)]
pub struct VariableList {
    pub paths: Vec<String>,
}

impl CommandResult for VariableList {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        self.paths.iter().map(|p| format!("{}\n", p)).collect()
    }
}

/// Result of `var get <spec>`.
#[derive(Serialize)]
pub struct RenderedVariable {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(skip)]
    rendered: String,
}

impl RenderedVariable {
    pub fn new(variable: &Variable, spec: &VariableSpec) -> Self {
        let rendered = render(variable, spec);
        if spec.is_keyed() {
            Self {
                path: variable.path.clone(),
                key: Some(spec.key().to_string()),
                value: lookup(variable, spec).map(str::to_string),
                items: None,
                rendered,
            }
        } else {
            Self {
                path: variable.path.clone(),
                key: None,
                value: None,
                items: Some(variable.items.clone()),
                rendered,
            }
        }
    }
}

impl CommandResult for RenderedVariable {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Raw output, with no trailing newline added.
    fn to_human(&self) -> String {
        self.rendered.clone()
    }
}
