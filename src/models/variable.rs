//! Variables as stored in the remote configuration store.
//!
//! Field names follow the Nomad wire format (`Path`, `Items`, ...) so the
//! same types serialize directly into API requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value contents of a variable.
pub type Items = BTreeMap<String, String>;

/// A variable: a path plus a map of string keys to string values.
///
/// The store has no partial update: changing one key means writing the whole
/// `items` map back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Variable {
    /// Namespace the variable lives in (store-specific, may be absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Unique identifier in the store
    pub path: String,

    /// Key/value contents
    #[serde(default)]
    pub items: Items,

    /// Store version token, used for check-and-set updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_index: Option<u64>,
}

impl Variable {
    /// Create an empty, not-yet-persisted variable at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Builder: set a single item.
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    /// Get an item's value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

/// A lightweight listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariableMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_index: Option<u64>,
}

impl From<&Variable> for VariableMetadata {
    fn from(var: &Variable) -> Self {
        Self {
            namespace: var.namespace.clone(),
            path: var.path.clone(),
            modify_index: var.modify_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_nomad_variable() {
        let json = r#"{
            "Namespace": "default",
            "Path": "nomad/jobs/web",
            "CreateIndex": 10,
            "ModifyIndex": 12,
            "Items": {"db_url": "postgres://x"}
        }"#;
        let var: Variable = serde_json::from_str(json).unwrap();
        assert_eq!(var.path, "nomad/jobs/web");
        assert_eq!(var.namespace.as_deref(), Some("default"));
        assert_eq!(var.modify_index, Some(12));
        assert_eq!(var.get("db_url"), Some("postgres://x"));
    }

    #[test]
    fn test_deserialize_without_items() {
        let var: Variable = serde_json::from_str(r#"{"Path": "a"}"#).unwrap();
        assert!(var.items.is_empty());
        assert_eq!(var.modify_index, None);
    }

    #[test]
    fn test_serialize_skips_empty_optionals() {
        let var = Variable::new("a").with_item("k", "v");
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json["Path"], "a");
        assert_eq!(json["Items"]["k"], "v");
        assert!(json.get("ModifyIndex").is_none());
        assert!(json.get("Namespace").is_none());
    }

    #[test]
    fn test_metadata_from_variable() {
        let mut var = Variable::new("jobs/a");
        var.modify_index = Some(3);
        let meta = VariableMetadata::from(&var);
        assert_eq!(meta.path, "jobs/a");
        assert_eq!(meta.modify_index, Some(3));
    }
}
