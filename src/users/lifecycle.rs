use crate::error::UserError;
use crate::runner::CommandRunner;
use crate::ui::prelude::*;

use super::{LinuxUsers, require_username};

impl<R: CommandRunner> LinuxUsers<R> {
    /// Create an account with a home directory and the given login shell.
    ///
    /// A failing `useradd` may leave a partial account behind; that is
    /// reported, not cleaned up.
    pub fn create(&self, username: &str, shell: &str) -> Result<(), UserError> {
        if username.is_empty() || shell.is_empty() {
            return Err(UserError::InvalidInput(
                "username and shell cannot be empty".to_string(),
            ));
        }

        let shells = self.shells();
        if !shells.contains(shell) {
            return Err(UserError::InvalidInput(format!(
                "invalid shell, valid options are: {}",
                shells.shells().join(" ")
            )));
        }

        self.require_program("useradd")?;

        let home_dir = self.config.home_dir_for(username);
        let args = vec![
            "--create-home".to_string(),
            "--home-dir".to_string(),
            home_dir.display().to_string(),
            "--shell".to_string(),
            shell.to_string(),
            username.to_string(),
        ];
        self.run_checked("useradd", &args)?;

        emit(
            Level::Debug,
            "users.create",
            &format!("created {} with home {}", username, home_dir.display()),
            None,
        );
        Ok(())
    }

    /// Delete an account, optionally with its home directory.
    ///
    /// The sudoers marker is left alone; see [`LinuxUsers::remove_sudo`].
    pub fn delete(&self, username: &str, remove_homedir: bool) -> Result<(), UserError> {
        require_username(username)?;
        self.require_program("userdel")?;

        let mut args = Vec::with_capacity(2);
        if remove_homedir {
            args.push("-r".to_string());
        }
        args.push(username.to_string());
        self.run_checked("userdel", &args)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::runner::CommandOutput;
    use crate::runner::fake::FakeRunner;
    use crate::users::testutil::TestHost;

    fn host() -> TestHost {
        TestHost::new("", "/bin/bash\n/bin/sh\n")
    }

    #[test]
    fn create_runs_useradd_with_home_and_shell() {
        let host = host();
        let users = host.users(FakeRunner::with_programs(&["useradd"]));
        users.create("carol", "/bin/sh").unwrap();

        let home = host.root().join("home").join("carol");
        assert_eq!(
            users.runner.calls(),
            vec![(
                "useradd".to_string(),
                vec![
                    "--create-home".to_string(),
                    "--home-dir".to_string(),
                    home.display().to_string(),
                    "--shell".to_string(),
                    "/bin/sh".to_string(),
                    "carol".to_string(),
                ]
            )]
        );
    }

    #[test]
    fn create_uses_stock_home_path_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = HostConfig {
            shells_file: dir.path().join("missing-shells"),
            ..HostConfig::default()
        };
        let users = LinuxUsers::new(config, FakeRunner::with_programs(&["useradd"]));

        users.create("dave", "/bin/bash").unwrap();
        assert!(users.runner.calls()[0].1.contains(&"/home/dave".to_string()));
    }

    #[test]
    fn create_rejects_unapproved_shell_before_running_anything() {
        let host = host();
        let users = host.users(FakeRunner::with_programs(&["useradd"]));

        let err = users.create("carol", "/bin/tcsh").unwrap_err();
        match err {
            UserError::InvalidInput(msg) => assert!(msg.contains("/bin/bash /bin/sh"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(users.runner.calls().is_empty());
    }

    #[test]
    fn create_rejects_empty_arguments() {
        let host = host();
        let users = host.users(FakeRunner::with_programs(&["useradd"]));
        assert!(matches!(
            users.create("", "/bin/bash"),
            Err(UserError::InvalidInput(_))
        ));
        assert!(matches!(
            users.create("carol", ""),
            Err(UserError::InvalidInput(_))
        ));
    }

    #[test]
    fn create_needs_useradd() {
        let host = host();
        let users = host.users(FakeRunner::new());
        assert!(matches!(
            users.create("carol", "/bin/bash"),
            Err(UserError::DependencyMissing(ref p)) if p == "useradd"
        ));
    }

    #[test]
    fn create_propagates_useradd_failure() {
        let mut runner = FakeRunner::new();
        runner.respond(
            "useradd",
            CommandOutput {
                code: Some(9),
                stdout: String::new(),
                stderr: "useradd: user 'carol' already exists\n".to_string(),
            },
        );
        let host = host();
        let users = host.users(runner);

        match users.create("carol", "/bin/bash").unwrap_err() {
            UserError::CommandFailed {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "useradd");
                assert_eq!(code, Some(9));
                assert!(stderr.contains("already exists"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn delete_adds_recursive_flag_only_when_asked() {
        let host = host();
        let users = host.users(FakeRunner::with_programs(&["userdel"]));
        users.delete("bob", true).unwrap();
        users.delete("bob", false).unwrap();

        let calls = users.runner.calls();
        assert_eq!(calls[0].1, ["-r", "bob"]);
        assert_eq!(calls[1].1, ["bob"]);
    }

    #[test]
    fn delete_preconditions() {
        let host = host();
        let users = host.users(FakeRunner::new());
        assert!(matches!(users.delete("", true), Err(UserError::InvalidInput(_))));
        assert!(matches!(
            users.delete("bob", true),
            Err(UserError::DependencyMissing(_))
        ));
    }

    #[test]
    fn delete_leaves_sudo_marker() {
        let host = host();
        let marker = host.config.sudoers_file_for("bob");
        std::fs::write(&marker, "bob ALL=(ALL) NOPASSWD: ALL\n").unwrap();

        let users = host.users(FakeRunner::with_programs(&["userdel"]));
        users.delete("bob", true).unwrap();
        assert!(marker.exists());
    }
}
