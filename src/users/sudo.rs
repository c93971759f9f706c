//! Admin status through per-user sudoers drop-ins.
//!
//! An admin is an account with a file named after it in the sudoers include
//! directory holding the default rule below. Checking for that file is enough
//! for accounts this tool promoted. Accounts configured some other way are
//! checked with a non-interactive `sudo -l`, which must list the exact
//! default rule.

use std::fs::{self, OpenOptions, Permissions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use crate::error::UserError;
use crate::runner::CommandRunner;
use crate::ui::prelude::*;

use super::models::PasswdEntry;
use super::{LinuxUsers, require_username};

/// Run anything as anyone, no password
pub const SUDOERS_PRIVS: &str = "(ALL) NOPASSWD: ALL";

const SUDOERS_MODE: u32 = 0o440;

pub fn sudoers_rule(username: &str) -> String {
    format!("{} ALL={}\n", username, SUDOERS_PRIVS)
}

impl<R: CommandRunner> LinuxUsers<R> {
    /// Whether the account has unrestricted passwordless sudo
    pub fn has_sudo(&self, username: &str) -> Result<bool, UserError> {
        require_username(username)?;
        self.require_program("sudo")?;
        let entry = self.lookup(username)?;
        self.sudo_state(&entry.name)
    }

    /// Admin status of an account already read from the database
    pub(super) fn has_sudo_for(&self, entry: &PasswdEntry) -> Result<bool, UserError> {
        self.require_program("sudo")?;
        self.sudo_state(&entry.name)
    }

    fn sudo_state(&self, username: &str) -> Result<bool, UserError> {
        let marker = self.config.sudoers_file_for(username);
        match fs::metadata(&marker) {
            Ok(meta) => Ok(!meta.is_dir()),
            Err(err) if err.kind() == ErrorKind::NotFound => self.sudo_list_check(username),
            Err(err) => Err(UserError::io(&marker)(err)),
        }
    }

    /// Grant or revoke admin status by writing or deleting the marker file
    pub fn update_sudo(&self, username: &str, admin: bool) -> Result<(), UserError> {
        require_username(username)?;
        self.require_program("sudo")?;
        self.lookup(username)?;

        let marker = self.config.sudoers_file_for(username);
        if admin {
            write_marker(&marker, &sudoers_rule(username))?;
            emit(
                Level::Debug,
                "users.sudo.granted",
                &format!("wrote {}", marker.display()),
                None,
            );
        } else {
            fs::remove_file(&marker).map_err(UserError::io(&marker))?;
            emit(
                Level::Debug,
                "users.sudo.revoked",
                &format!("removed {}", marker.display()),
                None,
            );
        }

        Ok(())
    }

    /// Drop the marker file if present; the account need not exist anymore
    pub fn remove_sudo(&self, username: &str) -> Result<(), UserError> {
        require_username(username)?;

        let marker = self.config.sudoers_file_for(username);
        match fs::symlink_metadata(&marker) {
            Ok(_) => fs::remove_file(&marker).map_err(UserError::io(&marker)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(UserError::io(&marker)(err)),
        }
    }

    fn sudo_list_check(&self, username: &str) -> Result<bool, UserError> {
        let args = ["-n", "-l", "-U", username].map(String::from);
        let output = self.runner.run("sudo", &args).map_err(UserError::io("sudo"))?;

        if !output.success() {
            emit(
                Level::Debug,
                "users.sudo.list_failed",
                &format!(
                    "sudo -n -l -U {} exited with {:?}: {}",
                    username,
                    output.code,
                    output.stderr.trim()
                ),
                None,
            );
            return Ok(false);
        }

        Ok(output.stdout.contains(SUDOERS_PRIVS))
    }
}

fn write_marker(path: &Path, rule: &str) -> Result<(), UserError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(SUDOERS_MODE)
        .open(path)
        .map_err(UserError::io(path))?;
    file.write_all(rule.as_bytes())
        .map_err(UserError::io(path))?;
    // existing files and the umask both leave other modes behind
    fs::set_permissions(path, Permissions::from_mode(SUDOERS_MODE)).map_err(UserError::io(path))
}
