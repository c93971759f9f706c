use std::{fs, path::Path};

/// Used when the shells file is missing, unreadable, or lists nothing
pub const DEFAULT_SHELLS: [&str; 3] = ["/bin/sh", "/bin/bash", "/bin/csh"];

/// Approved login shells, loaded fresh from the shells file on each use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRegistry {
    shells: Vec<String>,
}

impl ShellRegistry {
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::fallback(),
        }
    }

    pub fn parse(contents: &str) -> Self {
        let shells: Vec<String> = contents
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();

        if shells.is_empty() {
            Self::fallback()
        } else {
            Self { shells }
        }
    }

    pub fn fallback() -> Self {
        Self {
            shells: DEFAULT_SHELLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn contains(&self, shell: &str) -> bool {
        self.shells.iter().any(|s| s == shell)
    }

    pub fn shells(&self) -> &[String] {
        &self.shells
    }
}
