//! Expression Parser
//!
//! Parses a single expression at the cursor. What unquoted text means depends
//! on the [`ExpressionContext`]: in command position it is opaque command
//! text, in value position it must be a safe literal word.
//!
//! Command-position text runs up to the first `;`, even one inside quotes.
//! `if [[ "a;b" == x ]]` is fine (the `[[` scanner handles it) but
//! `if grep "a;b" file; then` is cut short and will fail the syntax check.

use crate::ast::types::{
    ConditionalTest, Expression, Literal, QuoteStyle, QuotedLiteral, Span,
    SubcommandSubstitution,
};
use crate::parser::cursor::{Cursor, Matcher};
use crate::parser::scanner::Delimiters;
use crate::parser::types::{ExpressionContext, ParseResult, TranslationError, SHELL_LITERAL_PATTERN};

/// Parse one expression.
///
/// Returns `Ok(None)` at a statement terminator (`;`, end of line, trailing
/// `#` comment) unless `required` is set, in which case that is an error.
pub fn parse_expression(
    cursor: &mut Cursor,
    ctx: ExpressionContext,
    required: bool,
) -> ParseResult<Option<Expression>> {
    let spaced = cursor.skip_whitespace();
    let start = cursor.location();
    let missing = || -> ParseResult<Option<Expression>> {
        if required {
            Err(TranslationError::parse("Expected an expression", start))
        } else {
            Ok(None)
        }
    };

    let Some(first) = cursor.remaining().and_then(|rest| rest.chars().next()) else {
        return missing();
    };

    if cursor.eat("$") {
        if cursor.at("((") {
            return Err(TranslationError::unsupported(
                "Arithmetic expansion is not supported",
                start,
            ));
        }
        if !cursor.at("(") {
            return Err(TranslationError::unsupported(
                "Raw $VAR is not supported (wrap it in quotes or $(...))",
                start,
            ));
        }
        let command = cursor.scan_balanced(Delimiters::parens())?;
        return Ok(Some(Expression::Subcommand(SubcommandSubstitution {
            span: Span::new(start, cursor.location()),
            command,
        })));
    }

    if cursor.at("[[") {
        let text = cursor.scan_balanced(Delimiters::new("[[", "]]").strip_outer(false))?;
        return Ok(Some(Expression::Test(ConditionalTest {
            span: Span::new(start, cursor.location()),
            text,
        })));
    }

    if first == ';' {
        return missing();
    }

    if ctx == ExpressionContext::Command {
        let text = cursor
            .take_while(Matcher::Class(|c| c != ';'))
            .unwrap_or("")
            .trim_end()
            .to_string();
        if text.is_empty() {
            return missing();
        }
        return Ok(Some(Expression::Test(ConditionalTest {
            span: Span::new(start, cursor.location()),
            text,
        })));
    }

    // zsh only starts a comment at the beginning of a word
    if first == '#' {
        if !spaced {
            return Err(TranslationError::parse("Unexpected `#` inside a word", start));
        }
        cursor.skip_comment();
        return missing();
    }

    if let Some(text) = cursor.take_while(Matcher::Pattern(&SHELL_LITERAL_PATTERN)) {
        if !text.is_empty() {
            let text = text.to_string();
            return Ok(Some(Expression::Literal(Literal {
                span: Span::new(start, cursor.location()),
                text,
            })));
        }
    }

    if let Some(style) = QuoteStyle::from_char(first) {
        let inside_text = cursor.scan_quoted(style)?;
        return Ok(Some(Expression::Quoted(QuotedLiteral {
            span: Span::new(start, cursor.location()),
            inside_text,
            style,
        })));
    }

    Err(TranslationError::parse(
        format!("Unable to parse expression starting with `{}`", first),
        start,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::ErrorKind;

    fn value(src: &str) -> ParseResult<Option<Expression>> {
        parse_expression(&mut Cursor::from_source(src), ExpressionContext::Value, false)
    }

    #[test]
    fn test_literal() {
        match value("~/bin/tool-1.2 rest").unwrap() {
            Some(Expression::Literal(lit)) => assert_eq!(lit.text, "~/bin/tool-1.2"),
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_subcommand() {
        match value("$(echo /extra:$PATH)").unwrap() {
            Some(Expression::Subcommand(sub)) => assert_eq!(sub.command, "echo /extra:$PATH"),
            other => panic!("expected subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_subcommand_span() {
        let mut c = Cursor::from_source("$(printf '%s'\n  foo)");
        let expr = parse_expression(&mut c, ExpressionContext::Value, true)
            .unwrap()
            .unwrap();
        let span = expr.span();
        assert_eq!(span.start.line, 1);
        assert_eq!(span.end.line, 2);
        assert!(span.start <= span.end);
    }

    #[test]
    fn test_bare_variable_rejected() {
        let err = value("$FOO").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_test_expression_keeps_brackets() {
        match value("[[ -d /opt ]]").unwrap() {
            Some(Expression::Test(t)) => assert_eq!(t.text, "[[ -d /opt ]]"),
            other => panic!("expected test, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted() {
        match value("'bar baz'").unwrap() {
            Some(Expression::Quoted(q)) => {
                assert_eq!(q.inside_text, "bar baz");
                assert_eq!(q.style, QuoteStyle::Single);
            }
            other => panic!("expected quoted, got {:?}", other),
        }
    }

    #[test]
    fn test_command_context_stops_at_semicolon() {
        let mut c = Cursor::from_source("command -v brew >/dev/null ; then");
        let expr = parse_expression(&mut c, ExpressionContext::Command, true)
            .unwrap()
            .unwrap();
        match expr {
            Expression::Test(t) => assert_eq!(t.text, "command -v brew >/dev/null"),
            other => panic!("expected test, got {:?}", other),
        }
        assert_eq!(c.remaining(), Some("; then"));
    }

    #[test]
    fn test_terminators() {
        assert_eq!(value("   ").unwrap(), None);
        assert_eq!(value("; echo").unwrap(), None);
        assert_eq!(value(" # trailing").unwrap(), None);
        let err = parse_expression(&mut Cursor::from_source(";"), ExpressionContext::Value, true)
            .unwrap_err();
        assert_eq!(err.message(), "Expected an expression");
    }

    #[test]
    fn test_arithmetic_expansion_rejected() {
        let err = value("$((1+2))").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.message(), "Arithmetic expansion is not supported");
    }

    #[test]
    fn test_hash_inside_word_is_not_a_comment() {
        let err = value("#bar").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(value(" #bar").unwrap(), None);
    }

    #[test]
    fn test_glob_is_parse_error() {
        let err = value("*.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
