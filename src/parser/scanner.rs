//! Delimiter Scanners
//!
//! Balanced-delimiter scanning (`$( ... )`, `[[ ... ]]`) and quoted-string
//! scanning. Neither decodes escapes: the enclosed text is returned verbatim.

use crate::ast::types::QuoteStyle;
use crate::parser::cursor::Cursor;
use crate::parser::types::{ParseResult, TranslationError};

/// Options for [`Cursor::scan_balanced`]
#[derive(Debug, Clone, Copy)]
pub struct Delimiters<'a> {
    pub opening: &'a str,
    pub closing: &'a str,
    /// May the match continue onto following lines?
    pub multiline: bool,
    /// Drop the outer opening/closing tokens from the result
    pub strip_outer: bool,
}

impl<'a> Delimiters<'a> {
    pub fn new(opening: &'a str, closing: &'a str) -> Self {
        Delimiters {
            opening,
            closing,
            multiline: false,
            strip_outer: true,
        }
    }

    /// `( ... )`, allowed to span lines
    pub fn parens() -> Delimiters<'static> {
        Delimiters::new("(", ")").multiline(true)
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn strip_outer(mut self, strip_outer: bool) -> Self {
        self.strip_outer = strip_outer;
        self
    }
}

impl Cursor {
    /// Scan from an `opening` token to its matching `closing` token, skipping
    /// nested pairs. The cursor must sit exactly on `opening`; on success it is
    /// left just past the matching `closing`.
    ///
    /// When both tokens occur ahead on a line, whichever comes first wins.
    pub fn scan_balanced(&mut self, delims: Delimiters<'_>) -> ParseResult<String> {
        let Delimiters {
            opening,
            closing,
            multiline,
            strip_outer,
        } = delims;
        debug_assert!(!opening.is_empty() && !closing.is_empty());
        let start = self.location();
        if !self.at(opening) {
            return Err(TranslationError::parse(
                format!("Expected an opening `{}`", opening),
                start,
            ));
        }
        let unterminated = || {
            TranslationError::parse(format!("Expected a matching closing `{}`", closing), start)
        };

        let start_line = self.line_index();
        let start_offset = self.offset();
        let mut idx = start_offset + opening.len();
        let mut depth = 1usize;
        loop {
            let (next_opening, next_closing) = {
                let line = self.current_line().ok_or_else(unterminated)?;
                let rest = &line[idx..];
                (
                    rest.find(opening).map(|i| i + idx),
                    rest.find(closing).map(|i| i + idx),
                )
            };
            match (next_opening, next_closing) {
                (None, None) => {
                    if !multiline || !self.advance_line() {
                        return Err(unterminated());
                    }
                    idx = 0;
                }
                (Some(open), Some(close)) if open < close => {
                    depth += 1;
                    idx = open + opening.len();
                }
                (Some(open), None) => {
                    depth += 1;
                    idx = open + opening.len();
                }
                (_, Some(close)) => {
                    depth -= 1;
                    idx = close + closing.len();
                    if depth == 0 {
                        break;
                    }
                }
            }
        }

        let text = if self.line_index() == start_line {
            let line = self.current_line().ok_or_else(unterminated)?;
            line[start_offset..idx].to_string()
        } else {
            let lines = self.lines();
            let end_line = self.line_index();
            let mut parts = Vec::with_capacity(end_line - start_line + 1);
            parts.push(&lines[start_line][start_offset..]);
            parts.extend(lines[start_line + 1..end_line].iter().map(String::as_str));
            parts.push(&lines[end_line][..idx]);
            parts.join("\n")
        };
        self.seek(idx);
        tracing::trace!(%start, end = %self.location(), opening, closing, "balanced scan");

        debug_assert!(text.starts_with(opening) && text.ends_with(closing));
        if strip_outer {
            Ok(text[opening.len()..text.len() - closing.len()].to_string())
        } else {
            Ok(text)
        }
    }

    /// Scan a quoted string on the current line, returning the text between
    /// the quotes. A quote preceded by an odd run of backslashes is part of
    /// the text. Other escapes pass through untouched.
    pub fn scan_quoted(&mut self, style: QuoteStyle) -> ParseResult<String> {
        let start = self.location();
        let quote = style.as_char();
        let rest = self.remaining().unwrap_or("");
        if !rest.starts_with(quote) {
            return Err(TranslationError::parse(
                format!("Expected an opening quote `{}`", quote),
                start,
            ));
        }

        let mut search_from = 1;
        let close = loop {
            let Some(found) = rest[search_from..].find(quote).map(|i| i + search_from) else {
                if self.later_lines_contain(quote) {
                    return Err(TranslationError::unsupported(
                        format!("Multi-line strings are unsupported (opening quote `{}`)", quote),
                        start,
                    ));
                }
                return Err(TranslationError::parse(
                    format!("Unable to find closing quote `{}`", quote),
                    start,
                ));
            };
            let backslashes = rest[..found]
                .chars()
                .rev()
                .take_while(|&c| c == '\\')
                .count();
            if backslashes % 2 == 1 {
                search_from = found + 1;
            } else {
                break found;
            }
        };

        let inside = rest[1..close].to_string();
        self.advance(close + 1);
        Ok(inside)
    }
}
