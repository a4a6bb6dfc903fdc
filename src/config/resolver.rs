//! Precedence resolution for settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`NOMAD_ADDR`, `NOMAD_NAMESPACE`, `NOMAD_TOKEN`)
//! 3. config.kdl / state.kdl
//! 4. Built-in defaults
//!
//! The token has no CLI flag; it comes from `NOMAD_TOKEN` or state.kdl.

use super::schema::{NomadConfConfig, NomadConfState, mask_token};
use crate::storage::{DEFAULT_ADDRESS, DEFAULT_NAMESPACE, DEFAULT_TIMEOUT, StoreConfig};
use serde::Serialize;
use std::time::Duration;

/// Environment variable for the server address.
pub const NOMAD_ADDR_ENV: &str = "NOMAD_ADDR";

/// Environment variable for the namespace.
pub const NOMAD_NAMESPACE_ENV: &str = "NOMAD_NAMESPACE";

/// Environment variable for the ACL token.
pub const NOMAD_TOKEN_ENV: &str = "NOMAD_TOKEN";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from a config or state file
    File(String),
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File(path) => write!(f, "file:{}", path),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub nomad_server: Option<String>,
    pub namespace: Option<String>,
    pub check_index: Option<bool>,
    pub strict_not_found: Option<bool>,
}

/// Files that settings were loaded from, for source labels.
#[derive(Debug, Clone, Default)]
pub struct LoadedFiles {
    pub config: NomadConfConfig,
    pub config_path: String,
    pub state: NomadConfState,
    pub state_path: String,
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSettings {
    pub nomad_server: Resolved<String>,
    pub namespace: Resolved<String>,
    pub check_index: Resolved<bool>,
    pub strict_not_found: Resolved<bool>,
    pub timeout_secs: Resolved<u64>,
    #[serde(skip)]
    pub token: Option<Resolved<String>>,
}

impl ResolvedSettings {
    /// Build the store connection settings.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            address: self.nomad_server.value.clone(),
            token: self.token.as_ref().map(|t| t.value.clone()),
            namespace: self.namespace.value.clone(),
            check_index: self.check_index.value,
            strict_not_found: self.strict_not_found.value,
            timeout: Duration::from_secs(self.timeout_secs.value),
        }
    }

    /// The token, masked for display.
    pub fn masked_token(&self) -> Option<String> {
        self.token.as_ref().map(|t| mask_token(&t.value))
    }
}

/// Pick the first present value in precedence order.
fn pick<T: Clone>(
    flag: Option<&T>,
    env: Option<(T, &str)>,
    file: Option<&T>,
    file_path: &str,
    default: T,
) -> Resolved<T> {
    if let Some(v) = flag {
        return Resolved::new(v.clone(), ValueSource::CliFlag);
    }
    if let Some((v, name)) = env {
        return Resolved::new(v, ValueSource::EnvVar(name.to_string()));
    }
    if let Some(v) = file {
        return Resolved::new(v.clone(), ValueSource::File(file_path.to_string()));
    }
    Resolved::new(default, ValueSource::Default)
}

/// Resolve settings, reading environment variables through `env`.
pub fn resolve_settings_with_env(
    files: &LoadedFiles,
    overrides: &ConfigOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedSettings {
    let env_var = |name: &'static str| {
        env(name)
            .filter(|v| !v.trim().is_empty())
            .map(|v| (v, name))
    };
    let config = &files.config;

    let nomad_server = pick(
        overrides.nomad_server.as_ref(),
        env_var(NOMAD_ADDR_ENV),
        config.nomad_server.as_ref(),
        &files.config_path,
        DEFAULT_ADDRESS.to_string(),
    );

    let namespace = pick(
        overrides.namespace.as_ref(),
        env_var(NOMAD_NAMESPACE_ENV),
        config.namespace.as_ref(),
        &files.config_path,
        DEFAULT_NAMESPACE.to_string(),
    );

    let check_index = pick(
        overrides.check_index.as_ref(),
        None,
        config.check_index.as_ref(),
        &files.config_path,
        false,
    );

    let strict_not_found = pick(
        overrides.strict_not_found.as_ref(),
        None,
        config.strict_not_found.as_ref(),
        &files.config_path,
        false,
    );

    let timeout_secs = pick(
        None,
        None,
        config.timeout_secs.as_ref(),
        &files.config_path,
        DEFAULT_TIMEOUT.as_secs(),
    );

    let token = match env_var(NOMAD_TOKEN_ENV) {
        Some((token, name)) => Some(Resolved::new(token, ValueSource::EnvVar(name.to_string()))),
        None => files
            .state
            .nomad_token
            .clone()
            .filter(|t| !t.is_empty())
            .map(|t| Resolved::new(t, ValueSource::File(files.state_path.clone()))),
    };

    ResolvedSettings {
        nomad_server,
        namespace,
        check_index,
        strict_not_found,
        timeout_secs,
        token,
    }
}

/// Resolve settings against the process environment.
pub fn resolve_settings(files: &LoadedFiles, overrides: &ConfigOverrides) -> ResolvedSettings {
    resolve_settings_with_env(files, overrides, |name| std::env::var(name).ok())
}
