//! Common test utilities for nomad-conf integration tests.
//!
//! Provides `TestEnv`, an isolated environment backed by a `file://` store so
//! tests never touch a real Nomad server or the user's config directory.

#![allow(dead_code)]

use assert_cmd::Command;
use nomad_conf::models::Variable;
use nomad_conf::storage::{FileBackend, VariableStore};
use std::path::Path;
pub use tempfile::TempDir;

/// A test environment with an isolated store and config directory.
///
/// The `nc()` method returns a `Command` with `NOMAD_ADDR` pointing at the
/// store and `NOMAD_CONF_CONFIG_DIR` pointing at the config directory, set
/// per-invocation so tests stay parallel-safe.
pub struct TestEnv {
    pub store_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            store_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// The `file://` address of the store.
    pub fn address(&self) -> String {
        format!("file://{}", self.store_dir.path().display())
    }

    /// Get a Command for the nomad-conf binary bound to this environment.
    pub fn nc(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nomad-conf"));
        cmd.env("NOMAD_ADDR", self.address());
        cmd.env("NOMAD_CONF_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("NOMAD_NAMESPACE");
        cmd.env_remove("NOMAD_TOKEN");
        cmd.env_remove("NOMAD_CONF_LOG");
        cmd
    }

    /// Direct handle on the backing store.
    pub fn store(&self) -> FileBackend {
        FileBackend::open_dir(self.store_dir.path()).unwrap()
    }

    /// Seed a variable with the given items.
    pub fn seed(&self, path: &str, items: &[(&str, &str)]) {
        let var = items
            .iter()
            .fold(Variable::new(path), |var, (k, v)| var.with_item(*k, *v));
        self.store().create(&var).unwrap();
    }

    /// Read a variable back, if present.
    pub fn read(&self, path: &str) -> Option<Variable> {
        self.store().read(path).ok()
    }

    /// Write a file inside the config directory and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.config_dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn config_path(&self) -> &Path {
        self.config_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
