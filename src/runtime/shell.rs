//! Shell Backend
//!
//! Runs command text through a real zsh. Every call is synchronous and
//! blocks until the child exits; stderr is inherited so messages reach the
//! user the way `$(...)` would show them.

use std::process::{Command, Stdio};

use indexmap::IndexMap;

use crate::runtime::error::{RuntimeError, RuntimeResult};

/// Result of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code, None if killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

pub trait ShellBackend {
    /// Parse `command` without executing it
    fn check_syntax(&self, command: &str) -> RuntimeResult<()>;

    /// Execute `command` with exactly `env` as its environment. `positional`
    /// becomes `$0 $1 ...`.
    fn execute(
        &self,
        command: &str,
        env: &IndexMap<String, String>,
        positional: &[String],
    ) -> RuntimeResult<ShellOutput>;
}

/// Spawns `zsh` child processes
#[derive(Debug, Clone)]
pub struct ZshProcess {
    program: String,
}

impl ZshProcess {
    pub fn new() -> Self {
        Self::with_program("zsh")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        ZshProcess {
            program: program.into(),
        }
    }
}

impl Default for ZshProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellBackend for ZshProcess {
    fn check_syntax(&self, command: &str) -> RuntimeResult<()> {
        let output = Command::new(&self.program)
            .args(["--no-exec", "-c", command])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RuntimeError::Syntax {
                command: command.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    #[tracing::instrument(level = "debug", skip(self, env, positional), fields(program = %self.program))]
    fn execute(
        &self,
        command: &str,
        env: &IndexMap<String, String>,
        positional: &[String],
    ) -> RuntimeResult<ShellOutput> {
        // zsh -c 'echo $1' foo bar  prints "bar": the first word after the
        // command text is $0
        let output = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .args(positional)
            .env_clear()
            .envs(env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()?;
        Ok(ShellOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
