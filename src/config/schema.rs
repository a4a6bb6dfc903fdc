//! KDL schema definitions for config.kdl and state.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Parsing from KDL documents
//! - Validation

use kdl::{KdlDocument, KdlValue};

/// User preferences stored in config.kdl.
///
/// Safe to sync across machines. File permissions: 0644 (rw-r--r--)
///
/// # KDL Schema
///
/// ```kdl
/// nomad-server "https://nomad.internal:4646"
/// namespace "default"
/// check-index #true
/// strict-not-found #false
/// timeout-secs 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NomadConfConfig {
    /// Nomad API address, or `file://<dir>` for a local store
    pub nomad_server: Option<String>,

    /// Nomad namespace
    pub namespace: Option<String>,

    /// Send check-and-set indexes with updates
    pub check_index: Option<bool>,

    /// Report transient read failures instead of "does not exist"
    pub strict_not_found: Option<bool>,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl NomadConfConfig {
    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref server) = self.nomad_server {
            if server.trim().is_empty() {
                return Err("nomad-server must not be empty".to_string());
            }
        }
        if let Some(ref namespace) = self.namespace {
            if namespace.trim().is_empty() {
                return Err("namespace must not be empty".to_string());
            }
        }
        if self.timeout_secs == Some(0) {
            return Err("timeout-secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            nomad_server: string_value(doc, "nomad-server"),
            namespace: string_value(doc, "namespace"),
            check_index: bool_value(doc, "check-index"),
            strict_not_found: bool_value(doc, "strict-not-found"),
            timeout_secs: first_value(doc, "timeout-secs")
                .and_then(|v| v.as_integer())
                .and_then(|i| u64::try_from(i).ok()),
        }
    }
}

/// Secrets stored in state.kdl.
///
/// **MUST be created with 0600 permissions (owner read/write only)**.
///
/// # KDL Schema
///
/// ```kdl
/// nomad-token "00000000-0000-0000-0000-000000000000"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NomadConfState {
    /// Nomad ACL token (sensitive!)
    pub nomad_token: Option<String>,
}

impl NomadConfState {
    /// Parse state from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            nomad_token: string_value(doc, "nomad-token"),
        }
    }
}

/// Tokens shorter than this are masked completely.
const MIN_PARTIAL_MASK_LEN: usize = 8;

/// Mask a token for display, keeping the first and last 4 characters.
///
/// Short tokens reveal only a prefix, and very short ones nothing at all.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < MIN_PARTIAL_MASK_LEN {
        "****".to_string()
    } else if chars.len() <= 12 {
        let head: String = chars.iter().take(4).collect();
        format!("{}...", head)
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Required permissions for state.kdl (Unix: 0600, owner read/write only).
#[cfg(unix)]
pub const STATE_FILE_MODE: u32 = 0o600;

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

fn string_value(doc: &KdlDocument, name: &str) -> Option<String> {
    first_value(doc, name)
        .and_then(|v| v.as_string())
        .map(str::to_string)
}

fn bool_value(doc: &KdlDocument, name: &str) -> Option<bool> {
    first_value(doc, name).and_then(|v| v.as_bool())
}
