use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fake host laid out under a temp directory, plus the config file pointing at it
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new(passwd: &str, shells: &str) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path();

        fs::write(root.join("passwd"), passwd)?;
        fs::write(root.join("shells"), shells)?;
        fs::create_dir_all(root.join("sudoers.d"))?;
        fs::create_dir_all(root.join("home"))?;

        let config = format!(
            "passwd_file = \"{root}/passwd\"\n\
             shells_file = \"{root}/shells\"\n\
             sudoers_dir = \"{root}/sudoers.d\"\n\
             home_base = \"{root}/home\"\n",
            root = root.display()
        );
        fs::write(root.join("config.toml"), config)?;

        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn home(&self, username: &str) -> PathBuf {
        self.path().join("home").join(username)
    }

    /// Write an authorized_keys file for `username` under the fake home base
    pub fn write_keys(&self, username: &str, keys: &[&str]) -> Result<()> {
        let ssh_dir = self.home(username).join(".ssh");
        fs::create_dir_all(&ssh_dir)?;
        fs::write(ssh_dir.join("authorized_keys"), keys.join("\n"))?;
        Ok(())
    }
}
