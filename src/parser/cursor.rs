//! Source Cursor
//!
//! A forward-only position over the source lines. Consumption never crosses a
//! line boundary on its own; moving to the next line is always explicit.
//! Lookahead is done by saving and restoring a [`Mark`].

use regex_lite::Regex;

use crate::ast::types::Location;
use crate::parser::types::{WHITESPACE_PATTERN, WORD_PATTERN};

/// What `take_while` consumes
#[derive(Clone, Copy)]
pub enum Matcher<'a> {
    /// Each character is tested on its own
    Class(fn(char) -> bool),
    /// Any character in the set
    Set(&'a [char]),
    /// Anchored pattern, applied to the rest of the line
    Pattern(&'a Regex),
}

impl Matcher<'_> {
    /// Byte length of the longest matching prefix of `text`
    fn prefix_len(&self, text: &str) -> usize {
        let by_char = |pred: &dyn Fn(char) -> bool| {
            text.char_indices()
                .find(|&(_, c)| !pred(c))
                .map_or(text.len(), |(idx, _)| idx)
        };
        match self {
            Matcher::Class(f) => by_char(f),
            Matcher::Set(set) => by_char(&|c: char| set.contains(&c)),
            Matcher::Pattern(re) => re
                .find(text)
                .filter(|m| m.start() == 0)
                .map_or(0, |m| m.end()),
        }
    }
}

/// Saved cursor position for lookahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    line_idx: usize,
    offset: usize,
}

#[derive(Debug, Clone)]
pub struct Cursor {
    lines: Vec<String>,
    /// Index into `lines`; equal to `lines.len()` once input is exhausted
    line_idx: usize,
    /// Byte offset into the current line
    offset: usize,
}

impl Cursor {
    pub fn new(lines: Vec<String>) -> Self {
        Cursor {
            lines,
            line_idx: 0,
            offset: 0,
        }
    }

    /// Split `source` into lines (`\n` or `\r\n`)
    pub fn from_source(source: &str) -> Self {
        Self::new(source.lines().map(str::to_string).collect())
    }

    pub fn location(&self) -> Location {
        Location::new(self.line_idx + 1, self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.line_idx >= self.lines.len()
    }

    pub fn current_line(&self) -> Option<&str> {
        self.lines.get(self.line_idx).map(String::as_str)
    }

    /// All source lines, for scanners that rebuild multi-line text
    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(crate) fn line_index(&self) -> usize {
        self.line_idx
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Unconsumed rest of the current line, or None at end of input
    pub fn remaining(&self) -> Option<&str> {
        self.current_line().map(|line| &line[self.offset..])
    }

    /// Does the rest of the current line start with `prefix`?
    pub fn at(&self, prefix: &str) -> bool {
        self.remaining().map_or(false, |rest| rest.starts_with(prefix))
    }

    /// Is there nothing left on the current line (or no line at all)?
    pub fn at_line_end(&self) -> bool {
        self.remaining().map_or(true, str::is_empty)
    }

    /// Consume `len` bytes of the current line
    pub fn advance(&mut self, len: usize) {
        if let Some(line) = self.current_line() {
            debug_assert!(self.offset + len <= line.len());
            self.offset = (self.offset + len).min(line.len());
        }
    }

    /// Move to a byte offset further along the current line
    pub(crate) fn seek(&mut self, offset: usize) {
        debug_assert!(offset >= self.offset, "cursor moved backwards");
        self.offset = offset;
    }

    /// Consume `prefix` if the rest of the line starts with it
    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.at(prefix) {
            self.advance(prefix.len());
            true
        } else {
            false
        }
    }

    /// Consume the longest prefix of the current line accepted by `matcher`.
    ///
    /// Returns None at end of input, otherwise the consumed text (possibly empty).
    pub fn take_while(&mut self, matcher: Matcher<'_>) -> Option<&str> {
        let start = self.offset;
        let len = matcher.prefix_len(self.remaining()?);
        self.offset += len;
        self.current_line().map(|line| &line[start..start + len])
    }

    /// Move to the start of the next line. Returns false once input is exhausted.
    pub fn advance_line(&mut self) -> bool {
        if self.is_eof() {
            return false;
        }
        self.line_idx += 1;
        self.offset = 0;
        !self.is_eof()
    }

    /// Returns true if any whitespace was consumed
    pub fn skip_whitespace(&mut self) -> bool {
        self.take_while(Matcher::Pattern(&WHITESPACE_PATTERN))
            .map_or(false, |ws| !ws.is_empty())
    }

    /// Skip lines that are empty, whitespace-only or `#` comments.
    ///
    /// Leaves the cursor on the first character of real content, or at end of input.
    pub fn skip_blank_and_comment_lines(&mut self) {
        while !self.is_eof() {
            self.skip_whitespace();
            if self.at_line_end() || self.at("#") {
                self.advance_line();
            } else {
                break;
            }
        }
    }

    /// Consume the rest of the line if it is a `#` comment
    pub fn skip_comment(&mut self) -> bool {
        if self.at("#") {
            let rest = self.remaining().map_or(0, str::len);
            self.advance(rest);
            true
        } else {
            false
        }
    }

    pub fn take_word(&mut self) -> Option<String> {
        self.take_while(Matcher::Pattern(&WORD_PATTERN))
            .map(str::to_string)
    }

    pub fn peek_word(&mut self) -> Option<String> {
        let mark = self.mark();
        let word = self.take_word();
        self.reset(mark);
        word
    }

    pub fn mark(&self) -> Mark {
        Mark {
            line_idx: self.line_idx,
            offset: self.offset,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.line_idx = mark.line_idx;
        self.offset = mark.offset;
    }

    /// Has any later line a `needle` in it? Used to tell an unterminated quote
    /// from a multi-line one.
    pub(crate) fn later_lines_contain(&self, needle: char) -> bool {
        self.lines
            .iter()
            .skip(self.line_idx + 1)
            .any(|line| line.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(src: &str) -> Cursor {
        Cursor::from_source(src)
    }

    #[test]
    fn test_take_while_class_stops_at_line_end() {
        let mut c = cursor("abc\ndef");
        assert_eq!(c.take_while(Matcher::Class(|c| c.is_alphabetic())), Some("abc"));
        assert_eq!(c.location(), Location::new(1, 3));
        assert_eq!(c.remaining(), Some(""));
    }

    #[test]
    fn test_take_while_set() {
        let mut c = cursor("$$(x)");
        assert_eq!(c.take_while(Matcher::Set(&['$'])), Some("$$"));
        assert_eq!(c.remaining(), Some("(x)"));
    }

    #[test]
    fn test_take_while_pattern_is_anchored() {
        let mut c = cursor("  foo");
        assert_eq!(c.take_while(Matcher::Pattern(&WORD_PATTERN)), Some(""));
        c.skip_whitespace();
        assert_eq!(c.take_while(Matcher::Pattern(&WORD_PATTERN)), Some("foo"));
    }

    #[test]
    fn test_take_while_at_eof() {
        let mut c = cursor("");
        assert!(c.is_eof());
        assert_eq!(c.take_while(Matcher::Class(|_| true)), None);
        assert_eq!(c.remaining(), None);
    }

    #[test]
    fn test_advance_line() {
        let mut c = cursor("one\ntwo");
        assert!(c.advance_line());
        assert_eq!(c.location(), Location::new(2, 0));
        assert_eq!(c.remaining(), Some("two"));
        assert!(!c.advance_line());
        assert!(c.is_eof());
        assert!(!c.advance_line());
    }

    #[test]
    fn test_skip_whitespace_reports_progress() {
        let mut c = cursor("  a#b");
        assert!(c.skip_whitespace());
        assert!(!c.skip_whitespace());
        assert_eq!(c.remaining(), Some("a#b"));
    }

    #[test]
    fn test_skip_blank_and_comment_lines() {
        let mut c = cursor("\n   \n  # a comment\n\t export FOO=1");
        c.skip_blank_and_comment_lines();
        assert_eq!(c.location(), Location::new(4, 2));
        assert_eq!(c.peek_word().as_deref(), Some("export"));
    }

    #[test]
    fn test_skip_blank_lines_to_eof() {
        let mut c = cursor("\n# only a comment\n");
        c.skip_blank_and_comment_lines();
        assert!(c.is_eof());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut c = cursor("local x=1");
        assert_eq!(c.peek_word().as_deref(), Some("local"));
        assert_eq!(c.location(), Location::new(1, 0));
        assert_eq!(c.take_word().as_deref(), Some("local"));
        assert_eq!(c.location(), Location::new(1, 5));
    }

    #[test]
    fn test_mark_and_reset() {
        let mut c = cursor("a\nb");
        let mark = c.mark();
        c.advance_line();
        c.reset(mark);
        assert_eq!(c.remaining(), Some("a"));
    }

    #[test]
    fn test_eat() {
        let mut c = cursor("() {");
        assert!(!c.eat("{"));
        assert!(c.eat("()"));
        assert_eq!(c.remaining(), Some(" {"));
    }

    #[test]
    fn test_multibyte_take_while() {
        let mut c = cursor("héllo wörld");
        assert_eq!(c.take_while(Matcher::Class(|c| c != ' ')), Some("héllo"));
        assert_eq!(c.remaining(), Some(" wörld"));
    }
}
