//! Persistent settings for the parts of a run that are not asked interactively.
//!
//! Settings come from `--config <path>`, else `<config dir>/multivpn/config.json` when it
//! exists, else built-in defaults. Individual CLI flags override the loaded values.

use crate::process::Invocation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_COMPOSE_COMMAND: &str = "docker-compose";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gluetun `VPN_SERVICE` value; its upper-case form prefixes the vendor credential keys.
    pub vpn_service: String,
    pub timezone: String,
    pub openvpn_config_dir: PathBuf,
    pub browser: String,
    pub docker_command: String,
    /// Program and leading arguments, e.g. `["docker", "compose"]`.
    pub compose_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vpn_service: "nordvpn".into(),
            timezone: "Europe/Berlin".into(),
            openvpn_config_dir: PathBuf::from("/etc/openvpn/ovpn_tcp"),
            browser: "chromium-browser".into(),
            docker_command: "docker".into(),
            compose_command: vec![DEFAULT_COMPOSE_COMMAND.into()],
        }
    }
}

/// Default settings location, if the platform has a config directory.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("multivpn").join("config.json"))
}

impl Settings {
    /// Load from an explicit path (which must exist) or from the default location (optional).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_settings_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    tracing::debug!("no settings file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("parse settings {}", path.display()))?;
        if settings.compose_command.iter().all(|s| s.trim().is_empty()) {
            anyhow::bail!("{}: compose_command must not be empty", path.display());
        }
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Upper-case vendor prefix for credential keys (`nordvpn` -> `NORDVPN`).
    pub fn vendor_key_prefix(&self) -> String {
        self.vpn_service
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Base invocation of the compose CLI, before any subcommand.
    pub fn compose(&self) -> Invocation {
        match self.compose_command.split_first() {
            Some((program, rest)) if !program.trim().is_empty() => {
                Invocation::new(program.clone()).args(rest.iter().cloned())
            }
            _ => Invocation::new(DEFAULT_COMPOSE_COMMAND),
        }
    }
}
