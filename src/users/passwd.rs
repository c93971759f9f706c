use std::collections::BTreeMap;
use std::fs;

use crate::error::UserError;
use crate::runner::CommandRunner;
use crate::ui::prelude::*;

use super::models::{Account, PasswdEntry};
use super::{LinuxUsers, require_username};

/// Records of the account database, in file order.
///
/// Comment lines and malformed records are skipped. The first blank line
/// ends the scan, the same way the database has always been read here.
pub fn parse_passwd(contents: &str) -> impl Iterator<Item = PasswdEntry> + '_ {
    contents
        .lines()
        .take_while(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#'))
        .filter_map(PasswdEntry::parse)
}

impl<R: CommandRunner> LinuxUsers<R> {
    fn read_passwd(&self) -> Result<String, UserError> {
        let path = &self.config.passwd_file;
        fs::read_to_string(path).map_err(UserError::io(path))
    }

    /// All human accounts keyed by username: login shell in the approved
    /// set and not root. Admin status is looked up per account.
    pub fn list(&self) -> Result<BTreeMap<String, Account>, UserError> {
        let contents = self.read_passwd()?;
        let shells = self.shells();

        let mut accounts = BTreeMap::new();
        for entry in parse_passwd(&contents) {
            if entry.name == "root" || !shells.contains(&entry.shell) {
                continue;
            }

            let admin = match self.has_sudo_for(&entry) {
                Ok(admin) => admin,
                Err(err) => {
                    emit(
                        Level::Debug,
                        "users.list.sudo_check",
                        &format!("admin check for {} failed: {}", entry.name, err),
                        None,
                    );
                    false
                }
            };

            accounts.insert(entry.name.clone(), Account::from_entry(entry, admin));
        }

        Ok(accounts)
    }

    /// Details for a single human account
    pub fn get(&self, username: &str) -> Result<Account, UserError> {
        require_username(username)?;

        self.list()?
            .remove(username)
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }

    /// Resolve any account in the database, human or not.
    ///
    /// Unlike listing, this reads past blank lines to the end of the file.
    pub(super) fn lookup(&self, username: &str) -> Result<PasswdEntry, UserError> {
        let contents = self.read_passwd()?;
        contents
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(PasswdEntry::parse)
            .find(|entry| entry.name == username)
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }
}
