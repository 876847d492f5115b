//! Runtime support for generated xonsh code
//!
//! Everything the emitted `ctx.*` calls rely on: execution scopes, running
//! text through zsh, type-preserving environment assignment and aliases.
//! The translator never calls into this module.

pub mod error;
pub mod typed;
pub mod env;
pub mod shell;
pub mod context;

pub use context::{quote_into_shell_string, Alias, AliasExpansion, Context, Runtime};
pub use env::{EnvStore, MemoryEnv};
pub use error::{RuntimeError, RuntimeResult};
pub use shell::{ShellBackend, ShellOutput, ZshProcess};
pub use typed::{splice_path, CoercionError, TypedValue, VarKind};
