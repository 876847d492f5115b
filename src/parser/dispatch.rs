//! Statement Dispatch Table
//!
//! Maps the leading word of a statement to the rule that parses it. The base
//! table (keywords and standard builtins) is fixed before any parse starts.
//! Each parser owns a private copy that grows as extra builtins and user
//! functions are registered; names never collide across categories.

use indexmap::IndexMap;

use crate::ast::types::{AssignmentKind, InvocationKind};
use crate::parser::types::is_word;

/// Builtins with a fixed translation
pub const STANDARD_BUILTINS: &[&str] = &["echo"];

/// Keywords outside the supported subset. Hitting one at statement position
/// is an explicit rejection rather than an "unexpected character".
pub const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "else", "elif", "for", "while", "until", "case", "select", "repeat", "coproc",
];

/// How a statement starting with a given word is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Assignment(AssignmentKind),
    Conditional,
    FunctionDeclaration,
    Invocation(InvocationKind),
}

lazy_static::lazy_static! {
    static ref BASE_DISPATCH: IndexMap<&'static str, Rule> = {
        let mut m = IndexMap::new();
        m.insert("export", Rule::Assignment(AssignmentKind::Export));
        m.insert("local", Rule::Assignment(AssignmentKind::Local));
        m.insert("alias", Rule::Assignment(AssignmentKind::Alias));
        m.insert("if", Rule::Conditional);
        m.insert("function", Rule::FunctionDeclaration);
        for &name in STANDARD_BUILTINS {
            debug_assert!(is_word(name), "invalid builtin name {name:?}");
            let previous = m.insert(name, Rule::Invocation(InvocationKind::StandardBuiltin));
            debug_assert!(previous.is_none(), "builtin {name:?} shadows a keyword");
        }
        m
    };
}

/// Why a name could not be registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    InvalidName,
    Conflict(Rule),
}

/// Per-parse dispatch table, seeded from the base table
#[derive(Debug, Clone)]
pub struct DispatchTable {
    rules: IndexMap<String, Rule>,
}

impl DispatchTable {
    pub fn new() -> Self {
        DispatchTable {
            rules: BASE_DISPATCH
                .iter()
                .map(|(name, rule)| (name.to_string(), *rule))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Rule> {
        self.rules.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Append a callable name. Existing entries are never replaced.
    pub fn register(&mut self, name: &str, kind: InvocationKind) -> Result<(), RegisterError> {
        if !is_word(name) {
            return Err(RegisterError::InvalidName);
        }
        if let Some(existing) = self.get(name) {
            return Err(RegisterError::Conflict(existing));
        }
        tracing::debug!(name, ?kind, "registered callable");
        self.rules.insert(name.to_string(), Rule::Invocation(kind));
        Ok(())
    }

    /// Names registered under `kind`, in registration order
    pub fn names_of(&self, kind: InvocationKind) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(move |(name, rule)| match rule {
            Rule::Invocation(k) if *k == kind => Some(name.as_str()),
            _ => None,
        })
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_unsupported_keyword(word: &str) -> bool {
    UNSUPPORTED_KEYWORDS.contains(&word)
}
