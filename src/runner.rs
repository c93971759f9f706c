//! External command execution
//!
//! Every mutating account operation is a single call to a standard OS tool.
//! `CommandRunner` is the narrow seam those calls go through so tests can
//! swap in a fake instead of touching the real system.

use std::io;
use std::path::PathBuf;

use duct::cmd;

use crate::ui::prelude::*;

/// Captured result of a finished external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandRunner {
    /// Locate `program` on the search path
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` to completion, capturing its output
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// Runs real executables found on `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        emit(
            Level::Debug,
            "runner.exec",
            &format!("running command: {} {}", program, args.join(" ")),
            None,
        );

        let output = cmd(program, args)
            .stdin_null()
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        emit(
            Level::Debug,
            "runner.exit",
            &format!("{} exited with {:?}", program, result.code),
            Some(serde_json::json!({
                "program": program,
                "args": args,
                "code": result.code,
                "stderr": result.stderr,
            })),
        );

        Ok(result)
    }
}

#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::path::PathBuf;

    use super::{CommandOutput, CommandRunner};

    /// Records invocations and replays scripted outputs
    #[derive(Debug, Default)]
    pub struct FakeRunner {
        installed: HashSet<String>,
        outputs: HashMap<String, CommandOutput>,
        calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Runner where the given programs exist and succeed silently
        pub fn with_programs(programs: &[&str]) -> Self {
            let mut runner = Self::new();
            for program in programs {
                runner.install(program);
            }
            runner
        }

        pub fn install(&mut self, program: &str) {
            self.installed.insert(program.to_string());
        }

        pub fn respond(&mut self, program: &str, output: CommandOutput) {
            self.install(program);
            self.outputs.insert(program.to_string(), output);
        }

        pub fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            self.installed
                .contains(program)
                .then(|| PathBuf::from("/usr/bin").join(program))
        }

        fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), args.to_vec()));
            if !self.installed.contains(program) {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
            Ok(self.outputs.get(program).cloned().unwrap_or(CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            }))
        }
    }
}
