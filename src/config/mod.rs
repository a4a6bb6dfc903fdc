//! Configuration and state management for nomad-conf.
//!
//! This module defines KDL schemas for two files:
//!
//! ## config.kdl - User preferences (safe to sync across machines)
//!
//! Located at `$NOMAD_CONF_CONFIG_DIR/config.kdl`, or
//! `~/.config/nomad-conf/config.kdl` when the variable is unset.
//!
//! Contains:
//! - `nomad-server` - Nomad API address
//! - `namespace` - Nomad namespace
//! - `check-index` - Send check-and-set indexes with updates
//! - `strict-not-found` - Report transient read failures distinctly
//! - `timeout-secs` - HTTP timeout
//!
//! ## state.kdl - Secrets (machine-specific)
//!
//! Located next to config.kdl when `NOMAD_CONF_CONFIG_DIR` is set, else at
//! `~/.local/share/nomad-conf/state.kdl`.
//!
//! Contains:
//! - `nomad-token` - Nomad ACL token
//!
//! ## Security
//!
//! `state.kdl` should be readable by its owner only (0600). A warning is
//! logged when it is group or world readable.
//!
//! ## Precedence
//!
//! CLI flag > environment > file > defaults. See [`resolver`].

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, LoadedFiles, NOMAD_ADDR_ENV, NOMAD_NAMESPACE_ENV, NOMAD_TOKEN_ENV, Resolved,
    ResolvedSettings, ValueSource, resolve_settings, resolve_settings_with_env,
};
pub use schema::{NomadConfConfig, NomadConfState, mask_token};
#[cfg(unix)]
pub use schema::STATE_FILE_MODE;

use crate::{Error, Result};
use kdl::KdlDocument;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Overrides the directory holding config.kdl and state.kdl.
pub const CONFIG_DIR_ENV: &str = "NOMAD_CONF_CONFIG_DIR";

const APP_DIR: &str = "nomad-conf";
const CONFIG_FILE: &str = "config.kdl";
const STATE_FILE: &str = "state.kdl";

/// Locations of the config and state files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub state_file: PathBuf,
}

impl ConfigPaths {
    /// Both files inside one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_file: dir.join(CONFIG_FILE),
            state_file: dir.join(STATE_FILE),
        }
    }

    /// Locate the files from `NOMAD_CONF_CONFIG_DIR` or the platform dirs.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::in_dir(Path::new(&dir)));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("could not determine data directory".to_string()))?;

        Ok(Self {
            config_file: config_dir.join(APP_DIR).join(CONFIG_FILE),
            state_file: data_dir.join(APP_DIR).join(STATE_FILE),
        })
    }

    /// Read both files. Missing files yield empty values.
    pub fn load(&self) -> Result<LoadedFiles> {
        Ok(LoadedFiles {
            config: read_config(&self.config_file)?,
            config_path: self.config_file.display().to_string(),
            state: read_state(&self.state_file)?,
            state_path: self.state_file.display().to_string(),
        })
    }
}

fn read_kdl(path: &Path) -> Result<Option<KdlDocument>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    content
        .parse::<KdlDocument>()
        .map(Some)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
}

/// Read and validate config.kdl.
pub fn read_config(path: &Path) -> Result<NomadConfConfig> {
    let Some(doc) = read_kdl(path)? else {
        return Ok(NomadConfConfig::default());
    };

    let config = NomadConfConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Read state.kdl, warning if its permissions are too open.
pub fn read_state(path: &Path) -> Result<NomadConfState> {
    let Some(doc) = read_kdl(path)? else {
        return Ok(NomadConfState::default());
    };

    warn_if_exposed(path);
    Ok(NomadConfState::from_kdl(&doc))
}

#[cfg(unix)]
fn warn_if_exposed(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = fs::metadata(path) {
        let mode = meta.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!(
                path = %path.display(),
                mode = format!("{:o}", mode),
                expected = format!("{:o}", STATE_FILE_MODE),
                "state file is readable by other users"
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_exposed(_path: &Path) {}
