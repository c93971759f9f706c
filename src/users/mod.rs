//! Linux user management
//!
//! Creating and removing accounts, listing human users, toggling
//! passwordless sudo through per-user sudoers drop-ins, and maintaining
//! each account's SSH authorized_keys file.
//!
//! All operations hang off [`LinuxUsers`], which carries the host file
//! locations and the command runner used for `useradd`, `userdel` and
//! `sudo`.

pub mod commands;
mod keys;
mod lifecycle;
mod models;
mod passwd;
mod pubkey;
mod shells;
mod sudo;

pub use pubkey::valid_authorized_key;
use shells::ShellRegistry;

use crate::config::HostConfig;
use crate::error::UserError;
use crate::runner::{CommandOutput, CommandRunner, SystemRunner};

pub struct LinuxUsers<R = SystemRunner> {
    config: HostConfig,
    runner: R,
}

impl<R: CommandRunner> LinuxUsers<R> {
    pub fn new(config: HostConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Approved login shells as currently listed on the host
    pub fn shells(&self) -> ShellRegistry {
        ShellRegistry::load(&self.config.shells_file)
    }

    fn require_program(&self, program: &str) -> Result<(), UserError> {
        match self.runner.locate(program) {
            Some(_) => Ok(()),
            None => Err(UserError::DependencyMissing(program.to_string())),
        }
    }

    /// Run a located program and fail unless it exits cleanly
    fn run_checked(&self, program: &str, args: &[String]) -> Result<CommandOutput, UserError> {
        let output = self
            .runner
            .run(program, args)
            .map_err(UserError::io(program))?;

        if !output.success() {
            return Err(UserError::CommandFailed {
                program: program.to_string(),
                code: output.code,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}

fn require_username(username: &str) -> Result<(), UserError> {
    if username.is_empty() {
        return Err(UserError::empty_username());
    }
    Ok(())
}
