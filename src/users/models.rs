use std::fmt;

use serde::Serialize;

/// Snapshot of one human account, rebuilt from the account database on every read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub username: String,
    pub admin: bool,
    pub full_name: String,
    pub shell: String,
    pub home_dir: String,
    pub uid: u32,
    pub gid: u32,
}

impl Account {
    pub(super) fn from_entry(entry: PasswdEntry, admin: bool) -> Self {
        Account {
            username: entry.name,
            admin,
            full_name: entry.gecos,
            shell: entry.shell,
            home_dir: entry.home_dir,
            uid: entry.uid,
            gid: entry.gid,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Username: {}", self.username)?;
        if !self.full_name.is_empty() {
            writeln!(f, "Name: {}", self.full_name)?;
        }
        writeln!(f, "Admin: {}", self.admin)?;
        writeln!(f, "Shell: {}", self.shell)?;
        writeln!(f, "Homedir: {}", self.home_dir)?;
        writeln!(f, "UID: {}", self.uid)?;
        write!(f, "GID: {}", self.gid)
    }
}

/// One raw record of the account database
///
/// `name:password:uid:gid:gecos:homedir:shell`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home_dir: String,
    pub shell: String,
}

impl PasswdEntry {
    /// Parse a single record. Records with fewer than five fields or
    /// non-numeric ids are treated as malformed.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 5 {
            return None;
        }

        let name = fields[0];
        if name.is_empty() {
            return None;
        }

        let uid = fields[2].trim().parse().ok()?;
        let gid = fields[3].trim().parse().ok()?;
        let home_dir = fields.get(5).copied().unwrap_or_default();
        // the login shell is whatever trails the record
        let shell = fields.last().copied().unwrap_or_default();

        Some(PasswdEntry {
            name: name.to_string(),
            uid,
            gid,
            gecos: fields[4].to_string(),
            home_dir: home_dir.to_string(),
            shell: shell.to_string(),
        })
    }
}
