use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "didn't find '{0}' executable: make sure it's installed and in the current PATH"
    )]
    DependencyMissing(String),

    #[error("unable to find user {0}")]
    NotFound(String),

    #[error("{program} failed with status {}", command_detail(.code, .stderr))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UserError {
    /// Adapter for `map_err` that attaches the path an I/O call failed on.
    pub fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> UserError {
        let path = path.as_ref().to_path_buf();
        move |source| UserError::Io { path, source }
    }

    pub fn empty_username() -> Self {
        UserError::InvalidInput("username cannot be empty".to_string())
    }
}

fn command_detail(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}
