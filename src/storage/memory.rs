//! In-memory store backend.
//!
//! Holds variables in a map and counts every call, so callers can assert how
//! many reads and writes an operation issued. Read failures can be injected
//! to exercise error paths.

use super::backend::VariableStore;
use super::{StoreError, StoreResult};
use crate::models::{Variable, VariableMetadata};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Per-operation call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub read: usize,
    pub create: usize,
    pub update: usize,
}

impl CallCounts {
    /// Number of mutating calls (create + update).
    pub fn writes(&self) -> usize {
        self.create + self.update
    }
}

/// Store backend backed by an in-process map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    variables: RefCell<BTreeMap<String, Variable>>,
    counts: Cell<CallCounts>,
    next_index: Cell<u64>,
    check_index: bool,
    strict_reads: bool,
    read_failure: RefCell<Option<String>>,
    path_failures: RefCell<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: honour `modify_index` on update.
    pub fn with_check_index(mut self, check_index: bool) -> Self {
        self.check_index = check_index;
        self
    }

    /// Builder: report non-not-found read errors distinctly.
    pub fn with_strict_reads(mut self, strict_reads: bool) -> Self {
        self.strict_reads = strict_reads;
        self
    }

    /// Seed a variable without counting it as a call.
    pub fn insert(&self, variable: Variable) {
        let mut variable = variable;
        variable.modify_index = Some(self.bump_index());
        self.variables
            .borrow_mut()
            .insert(variable.path.clone(), variable);
    }

    /// Make every subsequent read fail with a transport error.
    pub fn fail_reads(&self, message: impl Into<String>) {
        *self.read_failure.borrow_mut() = Some(message.into());
    }

    /// Make reads of one path fail with a transport error.
    pub fn fail_reads_for(&self, path: impl Into<String>, message: impl Into<String>) {
        self.path_failures
            .borrow_mut()
            .insert(path.into(), message.into());
    }

    /// Stop injecting read failures.
    pub fn clear_read_failure(&self) {
        *self.read_failure.borrow_mut() = None;
        self.path_failures.borrow_mut().clear();
    }

    /// Snapshot of a stored variable, without counting a read.
    pub fn get(&self, path: &str) -> Option<Variable> {
        self.variables.borrow().get(path).cloned()
    }

    /// Number of stored variables.
    pub fn len(&self) -> usize {
        self.variables.borrow().len()
    }

    /// Whether the store holds no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.borrow().is_empty()
    }

    /// Calls issued so far.
    pub fn counts(&self) -> CallCounts {
        self.counts.get()
    }

    fn record(&self, f: impl FnOnce(&mut CallCounts)) {
        let mut counts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }

    fn bump_index(&self) -> u64 {
        let index = self.next_index.get() + 1;
        self.next_index.set(index);
        index
    }
}

impl VariableStore for MemoryBackend {
    fn list(&self) -> StoreResult<Vec<VariableMetadata>> {
        self.record(|c| c.list += 1);
        Ok(self
            .variables
            .borrow()
            .values()
            .map(VariableMetadata::from)
            .collect())
    }

    fn read(&self, path: &str) -> StoreResult<Variable> {
        self.record(|c| c.read += 1);
        if let Some(message) = self.read_failure.borrow().as_ref() {
            return Err(StoreError::Transport(message.clone()));
        }
        if let Some(message) = self.path_failures.borrow().get(path) {
            return Err(StoreError::Transport(message.clone()));
        }
        self.variables
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn create(&self, variable: &Variable) -> StoreResult<()> {
        self.record(|c| c.create += 1);
        let mut stored = variable.clone();
        stored.modify_index = Some(self.bump_index());
        self.variables
            .borrow_mut()
            .insert(stored.path.clone(), stored);
        Ok(())
    }

    fn update(&self, variable: &Variable) -> StoreResult<()> {
        self.record(|c| c.update += 1);
        let mut variables = self.variables.borrow_mut();
        let current = variables
            .get(&variable.path)
            .ok_or_else(|| StoreError::NotFound(variable.path.clone()))?;

        if self.check_index {
            if let Some(expected) = variable.modify_index {
                if current.modify_index != Some(expected) {
                    return Err(StoreError::Conflict {
                        path: variable.path.clone(),
                        expected,
                    });
                }
            }
        }

        let mut stored = variable.clone();
        stored.modify_index = Some(self.bump_index());
        variables.insert(stored.path.clone(), stored);
        Ok(())
    }

    fn strict_reads(&self) -> bool {
        self.strict_reads
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_is_not_found() {
        let store = MemoryBackend::new();
        let err = store.read("nope").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.counts().read, 1);
    }

    #[test]
    fn test_create_then_read() {
        let store = MemoryBackend::new();
        store
            .create(&Variable::new("jobs/a").with_item("k", "v"))
            .unwrap();
        let var = store.read("jobs/a").unwrap();
        assert_eq!(var.get("k"), Some("v"));
        assert!(var.modify_index.is_some());
        assert_eq!(store.counts().create, 1);
    }

    #[test]
    fn test_update_missing_fails() {
        let store = MemoryBackend::new();
        let err = store.update(&Variable::new("jobs/a")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_insert_is_not_counted() {
        let store = MemoryBackend::new();
        store.insert(Variable::new("a"));
        assert_eq!(store.counts(), CallCounts::default());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_check_index_detects_concurrent_write() {
        let store = MemoryBackend::new().with_check_index(true);
        store.insert(Variable::new("a").with_item("k", "1"));

        let mut first = store.read("a").unwrap();
        let mut second = store.read("a").unwrap();

        first.items.insert("k".into(), "2".into());
        store.update(&first).unwrap();

        second.items.insert("k".into(), "3".into());
        let err = store.update(&second).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.get("a").unwrap().get("k"), Some("2"));
    }

    #[test]
    fn test_last_write_wins_without_check_index() {
        let store = MemoryBackend::new();
        store.insert(Variable::new("a").with_item("k", "1"));

        let mut first = store.read("a").unwrap();
        let mut second = store.read("a").unwrap();

        first.items.insert("k".into(), "2".into());
        store.update(&first).unwrap();
        second.items.insert("k".into(), "3".into());
        store.update(&second).unwrap();

        assert_eq!(store.get("a").unwrap().get("k"), Some("3"));
    }

    #[test]
    fn test_injected_read_failure() {
        let store = MemoryBackend::new();
        store.insert(Variable::new("a"));
        store.fail_reads("connection reset");
        assert!(matches!(
            store.read("a").unwrap_err(),
            StoreError::Transport(_)
        ));
        store.clear_read_failure();
        assert!(store.read("a").is_ok());
    }

    #[test]
    fn test_injected_read_failure_for_one_path() {
        let store = MemoryBackend::new();
        store.insert(Variable::new("a"));
        store.insert(Variable::new("b"));
        store.fail_reads_for("b", "connection reset");

        assert!(store.read("a").is_ok());
        assert!(matches!(
            store.read("b").unwrap_err(),
            StoreError::Transport(_)
        ));
        store.clear_read_failure();
        assert!(store.read("b").is_ok());
    }
}
