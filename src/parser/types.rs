//! Parser Types and Constants
//!
//! Shared error type, patterns and context flags used across parser modules.

use regex_lite::Regex;
use thiserror::Error;

use crate::ast::types::Location;

lazy_static::lazy_static! {
    /// An identifier-like word (`export`, `PATH`, `my_func`)
    pub static ref WORD_PATTERN: Regex = Regex::new(r"^\w+").unwrap();

    /// Leading whitespace
    pub static ref WHITESPACE_PATTERN: Regex = Regex::new(r"^\s*").unwrap();

    /// Characters allowed in an unquoted value. `*`, `?` and whitespace are
    /// left out so that no glob ever has to be expanded at translation time.
    pub static ref SHELL_LITERAL_PATTERN: Regex = Regex::new(r"^[\w~/\\.\-]+").unwrap();

    /// The empty parameter list of a function declaration
    pub static ref EMPTY_PARAMS_PATTERN: Regex = Regex::new(r"^\(\s*\)").unwrap();
}

/// Returns true if `name` is a complete word (used to validate registered names)
pub fn is_word(name: &str) -> bool {
    WORD_PATTERN
        .find(name)
        .map_or(false, |m| m.end() == name.len())
}

/// How unquoted text at expression position is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionContext {
    /// `if foo; then` -- the text up to `;` is a command
    Command,
    /// `local var=foo` -- unquoted text is a string value
    Value,
}

/// Broad category of a [`TranslationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Construct outside the supported subset (`elif`, bare `$VAR`, ...)
    Unsupported,
    /// Malformed input inside the subset (missing `fi`, unexpected char, ...)
    Parse,
    /// A well-formed tree that cannot be lowered
    Translate,
}

/// Every failure of a parse-then-translate pass.
///
/// There is no recovery: the first error aborts the whole pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("Unsupported zsh subset: {message}{}", at(.location))]
    Unsupported {
        message: String,
        location: Option<Location>,
    },

    #[error("Error parsing zsh subset: {message}{}", at(.location))]
    Parse {
        message: String,
        location: Option<Location>,
    },

    #[error("Translation error: {message}{}", at(.location))]
    Translate {
        message: String,
        location: Option<Location>,
    },
}

fn at(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" @ {}", loc),
        None => String::new(),
    }
}

impl TranslationError {
    pub fn unsupported(message: impl Into<String>, location: Location) -> Self {
        Self::Unsupported {
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn parse(message: impl Into<String>, location: Location) -> Self {
        Self::Parse {
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn translate(message: impl Into<String>, location: Option<Location>) -> Self {
        Self::Translate {
            message: message.into(),
            location,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Translate { .. } => ErrorKind::Translate,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unsupported { message, .. }
            | Self::Parse { message, .. }
            | Self::Translate { message, .. } => message,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Unsupported { location, .. }
            | Self::Parse { location, .. }
            | Self::Translate { location, .. } => *location,
        }
    }
}

pub type ParseResult<T> = Result<T, TranslationError>;
