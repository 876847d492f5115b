//! Translation to xonsh
//!
//! The driver parses the whole input first, then lowers each top-level
//! statement independently and joins the results. Nothing is emitted unless
//! every statement both parses and lowers.

pub mod literals;
pub mod lower;
pub mod settings;

pub use lower::Translator;
pub use settings::{ConfigError, Settings};

use crate::ast::types::Statement;
use crate::parser::types::TranslationError;
use crate::parser::parse;
use lower::{CTX, INDENT};

/// Translate zsh source to xonsh source.
///
/// `extra_builtins` are names the generated code may call directly, assumed
/// to be provided by the environment it runs in.
#[tracing::instrument(level = "debug", skip(source, settings), fields(source_len = source.len()))]
pub fn translate_to_xonsh(
    source: &str,
    settings: &Settings,
    extra_builtins: &[String],
) -> Result<String, TranslationError> {
    let statements = parse(source, extra_builtins)?;
    tracing::debug!(statements = statements.len(), "parsed script");
    translate_statements(&statements, settings)
}

/// Lower already-parsed statements, one emission per top-level statement.
pub fn translate_statements(
    statements: &[Statement],
    settings: &Settings,
) -> Result<String, TranslationError> {
    let translator = Translator::new(settings);
    let body = statements
        .iter()
        .map(|stmt| translator.statement(stmt))
        .collect::<Result<Vec<_>, _>>()?
        .join("\n");
    if settings.emit_preamble {
        Ok(with_preamble(&body, settings))
    } else {
        Ok(body)
    }
}

/// Wrap `body` so that it creates its own runtime context
fn with_preamble(body: &str, settings: &Settings) -> String {
    let mut lines = vec![
        format!("from {} import init_context", settings.runtime_module),
        format!("with init_context() as {CTX}:"),
    ];
    let before = lines.len();
    lines.extend(
        body.lines()
            .filter(|line| !line.is_empty())
            .map(|line| format!("{INDENT}{line}")),
    );
    if lines.len() == before {
        lines.push(format!("{INDENT}pass"));
    }
    lines.join("\n")
}
