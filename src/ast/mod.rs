//! Syntax Tree for the zsh subset
//!
//! The tree is the only thing the parser hands to the translator.
//!
//! Architecture:
//!   Source lines → Cursor → Parser → AST → Translator → xonsh source

pub mod types;
