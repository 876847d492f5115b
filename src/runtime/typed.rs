//! Typed Variable Values
//!
//! xonsh environment variables carry types (lists, booleans, integers) where
//! zsh only has strings. This module detects the kind of a previous value and
//! coerces a new flat string back into that kind.

use std::fmt;

use regex_lite::Regex;

use crate::runtime::error::{RuntimeError, RuntimeResult};

lazy_static::lazy_static! {
    static ref INTEGER_PATTERN: Regex = Regex::new(r"^[+-]?\d(_?\d)*$").unwrap();
}

/// A typed environment value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Str(String),
    Bool(bool),
    Int(i64),
    /// xonsh's `None`; only the empty string maps back to it
    Absent,
    /// `$PATH`-style list of directories
    PathList(Vec<String>),
    /// A value of a type this runtime does not understand, in string form
    Unknown(String),
}

/// The detected kind of a [`TypedValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    String,
    Boolean,
    Integer,
    Absent,
    PathList,
}

impl TypedValue {
    /// None when the type could not be detected
    pub fn kind(&self) -> Option<VarKind> {
        match self {
            TypedValue::Str(_) => Some(VarKind::String),
            TypedValue::Bool(_) => Some(VarKind::Boolean),
            TypedValue::Int(_) => Some(VarKind::Integer),
            TypedValue::Absent => Some(VarKind::Absent),
            TypedValue::PathList(_) => Some(VarKind::PathList),
            TypedValue::Unknown(_) => None,
        }
    }

    /// The string zsh would see for this value
    pub fn flatten(&self) -> String {
        match self {
            TypedValue::Str(s) | TypedValue::Unknown(s) => s.clone(),
            TypedValue::Bool(true) => "True".to_string(),
            TypedValue::Bool(false) => "False".to_string(),
            TypedValue::Int(i) => i.to_string(),
            TypedValue::Absent => String::new(),
            TypedValue::PathList(parts) => parts.join(":"),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

/// Why a string could not be coerced into a kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub kind: VarKind,
    pub text: String,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} cannot be read as {}", self.text, self.kind)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarKind::String => "str",
            VarKind::Boolean => "bool",
            VarKind::Integer => "int",
            VarKind::Absent => "None",
            VarKind::PathList => "EnvPath",
        };
        f.write_str(name)
    }
}

impl VarKind {
    /// Read `text` as a value of this kind.
    ///
    /// Path lists are not parsed here; they go through [`splice_path`].
    pub fn parse(self, text: &str) -> Result<TypedValue, CoercionError> {
        let fail = || CoercionError {
            kind: self,
            text: text.to_string(),
        };
        match self {
            VarKind::String => Ok(TypedValue::Str(text.to_string())),
            VarKind::Boolean => match text {
                "True" | "true" | "1" => Ok(TypedValue::Bool(true)),
                "False" | "false" | "0" => Ok(TypedValue::Bool(false)),
                _ => Err(fail()),
            },
            VarKind::Integer => {
                if !INTEGER_PATTERN.is_match(text) {
                    return Err(fail());
                }
                let digits: String = text.chars().filter(|c| *c != '_').collect();
                digits.parse().map(TypedValue::Int).map_err(|_| fail())
            }
            VarKind::Absent if text.is_empty() => Ok(TypedValue::Absent),
            VarKind::Absent | VarKind::PathList => Err(fail()),
        }
    }
}

/// Apply the change from `old_flat` to `new_flat` onto the list `target`.
///
/// Only additions are understood: `old_flat` must occur verbatim inside
/// `new_flat`. Whatever precedes it is inserted at the front of `target` (in
/// order), whatever follows is appended. Anything else is refused rather
/// than guessed at.
pub fn splice_path(
    var: &str,
    target: &mut Vec<String>,
    old_flat: &str,
    new_flat: &str,
) -> RuntimeResult<()> {
    let Some(offset) = new_flat.find(old_flat) else {
        return Err(RuntimeError::PathTooComplicated {
            var: var.to_string(),
            old: old_flat.to_string(),
            new: new_flat.to_string(),
        });
    };
    let prefix = &new_flat[..offset];
    let suffix = &new_flat[offset + old_flat.len()..];

    let mut prefixed: Vec<&str> = if prefix.is_empty() {
        Vec::new()
    } else {
        prefix.split(':').collect()
    };
    if prefixed.last() == Some(&"") {
        prefixed.pop();
    }
    for part in prefixed.into_iter().rev() {
        target.insert(0, part.to_string());
    }

    let mut suffixed: Vec<&str> = if suffix.is_empty() {
        Vec::new()
    } else {
        suffix.split(':').collect()
    };
    if suffixed.first() == Some(&"") {
        suffixed.remove(0);
    }
    target.extend(suffixed.into_iter().map(str::to_string));
    Ok(())
}
