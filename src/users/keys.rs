use std::fs::{self, DirBuilder, File, OpenOptions, Permissions};
use std::io::{self, ErrorKind, Write};
use std::os::fd::{AsRawFd, FromRawFd};
use std::os::unix::fs::{DirBuilderExt, MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::fcntl::{OFlag, openat};
use nix::sys::stat::Mode;
use nix::unistd::{Gid, Uid, fchown};

use crate::error::UserError;
use crate::runner::CommandRunner;
use crate::ui::prelude::*;

use super::pubkey::valid_authorized_key;
use super::{LinuxUsers, require_username};

const SSH_DIR_MODE: u32 = 0o700;
const AUTHORIZED_KEYS_MODE: u32 = 0o600;
const AUTHORIZED_KEYS: &str = "authorized_keys";

impl<R: CommandRunner> LinuxUsers<R> {
    /// Keys in the account's authorized_keys file, in file order.
    ///
    /// `None` means the file does not exist, as opposed to a file with no keys.
    pub fn authorized_keys(&self, username: &str) -> Result<Option<Vec<String>>, UserError> {
        require_username(username)?;
        let entry = self.lookup(username)?;
        let path = authorized_keys_path(Path::new(&entry.home_dir));

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(UserError::io(&path)(err)),
        };

        Ok(Some(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }

    /// Replace the account's authorized_keys file with `keys`.
    ///
    /// Creates `~/.ssh` when missing. Both the directory and the file end up
    /// owned by the account. Nothing is rolled back if a later step fails.
    pub fn update_authorized_keys(&self, username: &str, keys: &[String]) -> Result<(), UserError> {
        require_username(username)?;
        if let Some((idx, bad)) = keys
            .iter()
            .enumerate()
            .find(|(_, key)| !valid_authorized_key(key))
        {
            return Err(UserError::InvalidInput(format!(
                "invalid public key #{}: {}",
                idx + 1,
                bad
            )));
        }

        let entry = self.lookup(username)?;
        let uid = Uid::from_raw(entry.uid);
        let gid = Gid::from_raw(entry.gid);
        let home = Path::new(&entry.home_dir);

        let ssh_dir = ssh_dir_path(home);
        match DirBuilder::new().mode(SSH_DIR_MODE).create(&ssh_dir) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(UserError::io(&ssh_dir)(err)),
        }
        let dir = open_ssh_dir(&ssh_dir)?;
        set_owner(&dir, &ssh_dir, uid, gid)?;

        let keys_file = authorized_keys_path(home);
        let contents = keys
            .iter()
            .map(|key| key.trim())
            .collect::<Vec<_>>()
            .join("\n");
        let mut file = open_keys_file(&dir, &keys_file)?;
        write_keys(&mut file, &keys_file, &contents)?;
        set_owner(&file, &keys_file, uid, gid)?;

        emit(
            Level::Debug,
            "users.keys.written",
            &format!("wrote {} key(s) to {}", keys.len(), keys_file.display()),
            None,
        );

        Ok(())
    }
}

fn ssh_dir_path(home: &Path) -> PathBuf {
    home.join(".ssh")
}

fn authorized_keys_path(home: &Path) -> PathBuf {
    ssh_dir_path(home).join(AUTHORIZED_KEYS)
}

/// Open `~/.ssh` itself; a symlink or non-directory in its place is an error
fn open_ssh_dir(path: &Path) -> Result<File, UserError> {
    OpenOptions::new()
        .read(true)
        .custom_flags((OFlag::O_DIRECTORY | OFlag::O_NOFOLLOW).bits())
        .open(path)
        .map_err(UserError::io(path))
}

/// Open the key file relative to the already opened `.ssh` directory.
///
/// Symlinks, hard links and anything but a regular file are refused before
/// the file is truncated.
fn open_keys_file(dir: &File, path: &Path) -> Result<File, UserError> {
    let fd = openat(
        Some(dir.as_raw_fd()),
        AUTHORIZED_KEYS,
        OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_NOFOLLOW | OFlag::O_NONBLOCK | OFlag::O_CLOEXEC,
        Mode::from_bits_truncate(AUTHORIZED_KEYS_MODE),
    )
    .map_err(|errno| errno_at(path, errno))?;
    // SAFETY: openat just returned this descriptor and nothing else owns it
    let file = unsafe { File::from_raw_fd(fd) };

    let meta = file.metadata().map_err(UserError::io(path))?;
    if !meta.is_file() || meta.nlink() > 1 {
        return Err(UserError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(
                ErrorKind::InvalidInput,
                "not a regular file with a single link",
            ),
        });
    }

    Ok(file)
}

fn write_keys(file: &mut File, path: &Path, contents: &str) -> Result<(), UserError> {
    file.set_len(0).map_err(UserError::io(path))?;
    file.write_all(contents.as_bytes())
        .map_err(UserError::io(path))?;
    // an existing file keeps its old mode otherwise
    file.set_permissions(Permissions::from_mode(AUTHORIZED_KEYS_MODE))
        .map_err(UserError::io(path))
}

fn set_owner(file: &File, path: &Path, uid: Uid, gid: Gid) -> Result<(), UserError> {
    fchown(file.as_raw_fd(), Some(uid), Some(gid)).map_err(|errno| errno_at(path, errno))
}

fn errno_at(path: &Path, errno: Errno) -> UserError {
    UserError::Io {
        path: path.to_path_buf(),
        source: errno.into(),
    }
}
