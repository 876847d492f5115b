//! Runtime Errors
//!
//! Raised by the helpers generated code calls, never by the translator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The `--no-exec` pre-check rejected the command
    #[error("Invalid `zsh` command {command:?}: {reason}")]
    Syntax { command: String, reason: String },

    /// The command ran and exited non-zero
    #[error("Failed to execute {command:?}{}", exit_suffix(.returncode))]
    Execution {
        command: String,
        returncode: Option<i32>,
    },

    #[error("Changes between old and new ${var} are too complicated: {old:?} -> {new:?}")]
    PathTooComplicated {
        var: String,
        old: String,
        new: String,
    },

    #[error("Undefined environment variable: {0}")]
    NotFound(String),

    #[error("failed to run zsh: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_suffix(returncode: &Option<i32>) -> String {
    match returncode {
        Some(code) => format!(" (exit code {})", code),
        None => " (killed by signal)".to_string(),
    }
}

impl RuntimeError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, RuntimeError::Syntax { .. })
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
