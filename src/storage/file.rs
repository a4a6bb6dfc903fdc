//! File store backend.
//!
//! Keeps every variable in one JSON document at `<dir>/variables.json`:
//!
//! ```json
//! {
//!   "next_index": 3,
//!   "variables": {
//!     "jobs/a": { "items": { "db_url": "postgres://x" }, "modify_index": 2 }
//!   }
//! }
//! ```
//!
//! Each write rewrites the whole document through a temp file that is renamed
//! into place, so readers never see a half-written file.

use super::backend::{FILE_SCHEME, VariableStore};
use super::{StoreConfig, StoreError, StoreResult};
use crate::models::{Items, Variable, VariableMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the document inside the store directory.
const DOCUMENT_NAME: &str = "variables.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    next_index: u64,
    #[serde(default)]
    variables: BTreeMap<String, Entry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    #[serde(default)]
    items: Items,
    #[serde(default)]
    modify_index: u64,
}

/// Store backend that uses a local JSON document.
#[derive(Debug)]
pub struct FileBackend {
    /// Directory holding the document.
    root: PathBuf,
    namespace: String,
    check_index: bool,
    strict_reads: bool,
}

impl FileBackend {
    /// Open (creating if needed) the store directory named by a `file://` address.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let root = config
            .address
            .strip_prefix(FILE_SCHEME)
            .unwrap_or(&config.address);
        let mut backend = Self::open_dir(Path::new(root))?;
        backend.namespace = config.namespace.clone();
        backend.check_index = config.check_index;
        backend.strict_reads = config.strict_not_found;
        Ok(backend)
    }

    /// Open (creating if needed) a store directory.
    pub fn open_dir(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            namespace: super::DEFAULT_NAMESPACE.to_string(),
            check_index: false,
            strict_reads: false,
        })
    }

    /// Path of the JSON document.
    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENT_NAME)
    }

    fn load(&self) -> StoreResult<Document> {
        let path = self.document_path();
        if !path.exists() {
            return Ok(Document::default());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Document::default());
        }
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Parse(format!("{}: {}", path.display(), e)))
    }

    fn save(&self, doc: &Document) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(self.document_path())
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn to_variable(&self, path: &str, entry: &Entry) -> Variable {
        Variable {
            namespace: Some(self.namespace.clone()),
            path: path.to_string(),
            items: entry.items.clone(),
            modify_index: Some(entry.modify_index),
        }
    }

    fn put(&self, doc: &mut Document, variable: &Variable) {
        doc.next_index += 1;
        doc.variables.insert(
            variable.path.clone(),
            Entry {
                items: variable.items.clone(),
                modify_index: doc.next_index,
            },
        );
    }
}

impl VariableStore for FileBackend {
    fn list(&self) -> StoreResult<Vec<VariableMetadata>> {
        let doc = self.load()?;
        Ok(doc
            .variables
            .iter()
            .map(|(path, entry)| VariableMetadata::from(&self.to_variable(path, entry)))
            .collect())
    }

    fn read(&self, path: &str) -> StoreResult<Variable> {
        let doc = self.load()?;
        doc.variables
            .get(path)
            .map(|entry| self.to_variable(path, entry))
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn create(&self, variable: &Variable) -> StoreResult<()> {
        let mut doc = self.load()?;
        self.put(&mut doc, variable);
        self.save(&doc)
    }

    fn update(&self, variable: &Variable) -> StoreResult<()> {
        let mut doc = self.load()?;
        let current = doc
            .variables
            .get(&variable.path)
            .ok_or_else(|| StoreError::NotFound(variable.path.clone()))?;

        if self.check_index {
            if let Some(expected) = variable.modify_index {
                if current.modify_index != expected {
                    return Err(StoreError::Conflict {
                        path: variable.path.clone(),
                        expected,
                    });
                }
            }
        }

        self.put(&mut doc, variable);
        self.save(&doc)
    }

    fn strict_reads(&self) -> bool {
        self.strict_reads
    }

    fn location(&self) -> String {
        self.document_path().display().to_string()
    }

    fn backend_type(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_backend() -> (TempDir, FileBackend) {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::open_dir(temp_dir.path()).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_temp_dir, backend) = create_test_backend();
        assert!(backend.list().unwrap().is_empty());
        assert!(!backend.document_path().exists());
    }

    #[test]
    fn test_create_and_read() {
        let (_temp_dir, backend) = create_test_backend();
        backend
            .create(&Variable::new("jobs/a").with_item("db_url", "postgres://x"))
            .unwrap();

        let var = backend.read("jobs/a").unwrap();
        assert_eq!(var.get("db_url"), Some("postgres://x"));
        assert_eq!(var.modify_index, Some(1));
        assert_eq!(var.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn test_read_missing() {
        let (_temp_dir, backend) = create_test_backend();
        assert!(backend.read("jobs/a").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_replaces_whole_variable() {
        let (_temp_dir, backend) = create_test_backend();
        backend
            .create(&Variable::new("a").with_item("x", "1").with_item("y", "2"))
            .unwrap();
        backend.create(&Variable::new("a").with_item("z", "3")).unwrap();

        let var = backend.read("a").unwrap();
        assert_eq!(var.items.len(), 1);
        assert_eq!(var.get("z"), Some("3"));
    }

    #[test]
    fn test_update_missing_fails() {
        let (_temp_dir, backend) = create_test_backend();
        assert!(
            backend
                .update(&Variable::new("a"))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        {
            let backend = FileBackend::open_dir(temp_dir.path()).unwrap();
            backend.create(&Variable::new("a").with_item("k", "v")).unwrap();
        }
        let backend = FileBackend::open_dir(temp_dir.path()).unwrap();
        assert_eq!(backend.read("a").unwrap().get("k"), Some("v"));
        assert_eq!(backend.list().unwrap().len(), 1);
    }

    #[test]
    fn test_check_index_conflict() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = StoreConfig::new(format!("file://{}", temp_dir.path().display()));
        config.check_index = true;
        let backend = FileBackend::open(&config).unwrap();
        backend.create(&Variable::new("a").with_item("k", "1")).unwrap();

        let stale = backend.read("a").unwrap();
        let mut fresh = backend.read("a").unwrap();
        fresh.items.insert("k".into(), "2".into());
        backend.update(&fresh).unwrap();

        let err = backend.update(&stale).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { expected: 1, .. }));
    }

    #[test]
    fn test_corrupt_document_is_parse_error() {
        let (_temp_dir, backend) = create_test_backend();
        fs::write(backend.document_path(), "not json").unwrap();
        assert!(matches!(
            backend.read("a").unwrap_err(),
            StoreError::Parse(_)
        ));
    }
}
