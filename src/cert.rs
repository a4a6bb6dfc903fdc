//! Publishing Let's Encrypt certificates as Nomad variables.
//!
//! certbot keeps the current files for each certificate under
//! `<base>/live/<name>/`. A certificate is exported as one variable holding
//! two keys, `privkey` and `chain` (the full chain).

use crate::commands::CommandResult;
use crate::models::Variable;
use crate::storage::VariableStore;
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default certbot configuration directory.
pub const DEFAULT_LETSENCRYPT_BASE: &str = "/etc/letsencrypt";

/// Default prefix for certificate variable paths.
pub const DEFAULT_VAR_BASE: &str = "ssl_certs/";

pub const PRIVKEY_FILE: &str = "privkey.pem";
pub const FULLCHAIN_FILE: &str = "fullchain.pem";

pub const PRIVKEY_KEY: &str = "privkey";
pub const CHAIN_KEY: &str = "chain";

/// One certificate directory under `live/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertBundle {
    pub name: String,
    pub path: PathBuf,
}

impl CertBundle {
    pub fn privkey(&self) -> Result<String> {
        Ok(fs::read_to_string(self.path.join(PRIVKEY_FILE))?)
    }

    pub fn chain(&self) -> Result<String> {
        Ok(fs::read_to_string(self.path.join(FULLCHAIN_FILE))?)
    }
}

/// A certbot directory and the certificates found in it.
#[derive(Debug, Clone)]
pub struct LetsEncryptDir {
    base: PathBuf,
    certs: Vec<CertBundle>,
}

impl LetsEncryptDir {
    /// Scan `<base>/live` for complete certificate directories.
    ///
    /// Directories missing either PEM file are skipped.
    pub fn open(base: &Path) -> Result<Self> {
        if !base.is_dir() {
            return Err(Error::InvalidInput(format!(
                "letsencrypt base {} not found",
                base.display()
            )));
        }

        let live = base.join("live");
        if !live.is_dir() {
            return Err(Error::InvalidInput(format!(
                "certificate directory {} not found",
                live.display()
            )));
        }

        let mut certs = Vec::new();
        for entry in fs::read_dir(&live)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if !(path.join(FULLCHAIN_FILE).exists() && path.join(PRIVKEY_FILE).exists()) {
                tracing::debug!(path = %path.display(), "skipping incomplete certificate directory");
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            certs.push(CertBundle {
                name: name.to_string(),
                path: path.clone(),
            });
        }
        certs.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            base: base.to_path_buf(),
            certs,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn certs(&self) -> &[CertBundle] {
        &self.certs
    }

    /// Names of all certificates found.
    pub fn names(&self) -> Vec<&str> {
        self.certs.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a certificate by name.
    pub fn find(&self, name: &str) -> Result<&CertBundle> {
        self.certs.iter().find(|c| c.name == name).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unknown certificate {} (valid choices: {})",
                name,
                self.names().join(", ")
            ))
        })
    }
}

/// Variable path for a certificate.
///
/// Periods are not allowed in Nomad variable paths, so they become `_`.
pub fn cert_variable_path(var_base: &str, name: &str) -> String {
    format!("{}{}", var_base, name.replace('.', "_"))
}

/// What `export_cert` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertExport {
    Unchanged,
    Written,
}

/// Write a certificate to its variable unless both keys already match.
///
/// A missing variable is created. Any other read failure is returned so
/// that a permission problem is not mistaken for absence.
pub fn export_cert(
    store: &dyn VariableStore,
    bundle: &CertBundle,
    var_base: &str,
) -> Result<CertExport> {
    let path = cert_variable_path(var_base, &bundle.name);
    let privkey = bundle.privkey()?;
    let chain = bundle.chain()?;

    match store.read(&path) {
        Ok(existing) => {
            if existing.get(PRIVKEY_KEY) == Some(privkey.as_str())
                && existing.get(CHAIN_KEY) == Some(chain.as_str())
            {
                tracing::info!(path = %path, "certificate unchanged");
                return Ok(CertExport::Unchanged);
            }
            tracing::info!(path = %path, "certificate changed, updating");
        }
        Err(e) if e.is_not_found() => {
            tracing::info!(path = %path, "no existing certificate variable");
        }
        Err(e) => return Err(e.into()),
    }

    let var = Variable::new(path.as_str())
        .with_item(PRIVKEY_KEY, privkey)
        .with_item(CHAIN_KEY, chain);
    store.create(&var)?;
    Ok(CertExport::Written)
}

/// Result of the `cert` command.
#[derive(Serialize)]
pub struct CertResult {
    pub name: String,
    pub variable: String,
    pub action: CertExport,
}

impl CommandResult for CertResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match self.action {
            CertExport::Unchanged => format!("{} unchanged at {}\n", self.name, self.variable),
            CertExport::Written => format!("Exported {} to {}\n", self.name, self.variable),
        }
    }
}
