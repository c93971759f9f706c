//! Host configuration
//!
//! Locations of the well-known system files this tool reads and writes.
//! Every key is optional; a missing config file means stock Linux paths.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/spinup-user.toml";
pub const CONFIG_ENV: &str = "SPINUP_USER_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// System account database
    pub passwd_file: PathBuf,
    /// Approved login shells
    pub shells_file: PathBuf,
    /// sudoers include directory holding one marker file per admin
    pub sudoers_dir: PathBuf,
    /// Parent of newly created home directories
    pub home_base: PathBuf,
    /// Login shell used by `add` when none is given
    pub default_shell: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            passwd_file: PathBuf::from("/etc/passwd"),
            shells_file: PathBuf::from("/etc/shells"),
            sudoers_dir: PathBuf::from("/etc/sudoers.d"),
            home_base: PathBuf::from("/home"),
            default_shell: "/bin/bash".to_string(),
        }
    }
}

impl HostConfig {
    /// Load the config from `path`, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading host config from {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing host config at {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the config path from an explicit flag, the environment, or the default
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn home_dir_for(&self, username: &str) -> PathBuf {
        self.home_base.join(username)
    }

    pub fn sudoers_file_for(&self, username: &str) -> PathBuf {
        self.sudoers_dir.join(username)
    }
}
