//! zsh2xonsh - translate a strict subset of zsh into xonsh
//!
//! Shell configuration scripts written for zsh are parsed into a small
//! syntax tree and lowered into xonsh source that delegates anything
//! non-trivial back to a real zsh at run time. Anything outside the subset
//! is rejected with a located error; no partial output is ever produced.

pub mod ast;
pub mod parser;
pub mod runtime;
pub mod translate;

pub use ast::types::*;
pub use parser::{parse, ErrorKind, Parser, TranslationError};
pub use translate::{translate_to_xonsh, ConfigError, Settings};
