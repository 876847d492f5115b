//! Parser module for the zsh subset
//!
//! This module contains the cursor, delimiter scanners and the recursive
//! descent parser that builds the syntax tree.

pub mod types;
pub mod cursor;
pub mod scanner;
pub mod dispatch;
pub mod expression_parser;
pub mod parser;

// Re-exports
pub use cursor::{Cursor, Matcher};
pub use dispatch::{DispatchTable, Rule};
pub use parser::{parse, Parser};
pub use types::{ErrorKind, ExpressionContext, TranslationError};
