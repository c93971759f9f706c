use anyhow::Result;
use std::io::Write;
use std::process::{Command, Stdio};

use super::common::TestEnvironment;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run the built binary against the test environment's config
pub fn run_spinup_user(env: &TestEnvironment, args: &[&str], stdin: &str) -> Result<CommandOutput> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_spinup-user"))
        .arg("--config")
        .arg(env.config_path())
        .arg("--no-color")
        .args(args)
        .env_remove("SPINUP_USER_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut input) = child.stdin.take() {
        input.write_all(stdin.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}
