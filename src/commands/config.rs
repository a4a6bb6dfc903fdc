//! `config show`.

use super::CommandResult;
use crate::config::{ConfigPaths, ResolvedSettings};
use serde::Serialize;

/// Resolved settings together with the files they were read from.
#[derive(Serialize)]
pub struct ConfigShow {
    pub config_file: String,
    pub state_file: String,
    #[serde(flatten)]
    pub settings: ResolvedSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_source: Option<String>,
}

impl ConfigShow {
    pub fn new(paths: &ConfigPaths, settings: ResolvedSettings) -> Self {
        Self {
            config_file: paths.config_file.display().to_string(),
            state_file: paths.state_file.display().to_string(),
            token: settings.masked_token(),
            token_source: settings.token.as_ref().map(|t| t.source.to_string()),
            settings,
        }
    }
}

impl CommandResult for ConfigShow {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let s = &self.settings;
        let mut lines = vec![
            format!("config file: {}", self.config_file),
            format!("state file: {}", self.state_file),
            format!(
                "nomad-server: {} ({})",
                s.nomad_server.value, s.nomad_server.source
            ),
            format!("namespace: {} ({})", s.namespace.value, s.namespace.source),
            format!(
                "check-index: {} ({})",
                s.check_index.value, s.check_index.source
            ),
            format!(
                "strict-not-found: {} ({})",
                s.strict_not_found.value, s.strict_not_found.source
            ),
            format!(
                "timeout-secs: {} ({})",
                s.timeout_secs.value, s.timeout_secs.source
            ),
        ];
        match (&self.token, &self.token_source) {
            (Some(token), Some(source)) => lines.push(format!("nomad-token: {} ({})", token, source)),
            _ => lines.push("nomad-token: (not set)".to_string()),
        }
        lines.iter().map(|l| format!("{}\n", l)).collect()
    }
}
