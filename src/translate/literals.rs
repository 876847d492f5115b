//! Literal Classification and Rendering
//!
//! Decides which source text is safe to emit directly (no glob, variable or
//! escape interpretation needed) and renders xonsh string literals.

use regex_lite::Regex;

lazy_static::lazy_static! {
    /// Quoted text that means the same thing in zsh and xonsh
    static ref SAFE_QUOTED_PATTERN: Regex = Regex::new(r"^[\w\-/]*$").unwrap();

    /// Unquoted text that can be emitted without asking zsh to expand it
    static ref SAFE_LITERAL_PATTERN: Regex = Regex::new(r"^[\w~/\\.\-]+$").unwrap();

    static ref INTEGER_PATTERN: Regex = Regex::new(r"^\d(_?\d)*$").unwrap();
}

/// Can the inside of a quoted string be emitted as a plain string literal?
///
/// True for `foo` and `foo/bar-baz`, false for anything involving globs,
/// variables, spaces or escapes.
pub fn is_simple_quoted(s: &str) -> bool {
    SAFE_QUOTED_PATTERN.is_match(s)
}

/// Can an unquoted word be emitted without a zsh round trip?
///
/// A leading `~` is only accepted when `allow_tilde` is set, since it still
/// needs home-directory expansion at run time.
pub fn is_simple_literal(s: &str, allow_tilde: bool) -> bool {
    if !allow_tilde && s.starts_with('~') {
        return false;
    }
    SAFE_LITERAL_PATTERN.is_match(s)
}

/// Decimal integer, optionally grouped with single underscores (`1_000`)
pub fn is_valid_integer(s: &str) -> bool {
    INTEGER_PATTERN.is_match(s)
}

/// Render an integer literal the way xonsh spells it (`007` → `7`, `1_000` → `1000`)
pub fn normalize_integer(s: &str) -> String {
    let digits: String = s.chars().filter(|c| *c != '_').collect();
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Can an alias body be split on single spaces into independent words?
///
/// `bar baz` can; `echo *.txt` cannot (zsh expands the glob per invocation,
/// relative to the working directory at that time). A backslash always
/// needs zsh to interpret it.
pub fn can_safely_be_split(text: &str) -> bool {
    text.split(' ')
        .all(|part| !part.contains('\\') && is_simple_literal(part, false))
}

/// Render `s` as a xonsh (Python) string literal, following `repr` rules.
pub fn py_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
