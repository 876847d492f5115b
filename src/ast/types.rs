//! Syntax Tree Types for the zsh subset
//!
//! Both node families are closed enums. Every consumer matches them
//! exhaustively, so an unknown node kind cannot reach the translator.

use std::fmt;

// =============================================================================
// BASE TYPES
// =============================================================================

/// Position of a character in the source.
///
/// `line` is 1-based, `offset` is a 0-based byte offset within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: usize,
    pub offset: usize,
}

impl Location {
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset)
    }
}

/// Half-open source range owned by a single node. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        Self { start, end }
    }
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// Union of all expression types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Quoted(QuotedLiteral),
    Subcommand(SubcommandSubstitution),
    Literal(Literal),
    Test(ConditionalTest),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Quoted(e) => e.span,
            Expression::Subcommand(e) => e.span,
            Expression::Literal(e) => e.span,
            Expression::Test(e) => e.span,
        }
    }
}

/// Which quote character delimited a quoted literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Self::Single),
            '"' => Some(Self::Double),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

/// `"..."` or `'...'`. The text is kept exactly as written, escapes undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedLiteral {
    pub span: Span,
    pub inside_text: String,
    pub style: QuoteStyle,
}

/// `$( ... )` with the outer delimiters stripped. May span several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcommandSubstitution {
    pub span: Span,
    pub command: String,
}

/// Bare word such as `foo`, `~/bin` or `12`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub span: Span,
    pub text: String,
}

/// A test command: either `[[ ... ]]` (brackets included) or the opaque
/// command text of an `if` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalTest {
    pub span: Span,
    pub text: String,
}

// =============================================================================
// STATEMENTS
// =============================================================================

/// Union of all statement types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assignment(Assignment),
    Conditional(Conditional),
    FunctionDeclaration(FunctionDeclaration),
    Invocation(Invocation),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Assignment(s) => s.span,
            Statement::Conditional(s) => s.span,
            Statement::FunctionDeclaration(s) => s.span,
            Statement::Invocation(s) => s.span,
        }
    }

    /// Short name used in log output
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Assignment(_) => "assignment",
            Statement::Conditional(_) => "conditional",
            Statement::FunctionDeclaration(_) => "function",
            Statement::Invocation(_) => "invocation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentKind {
    Export,
    Local,
    Alias,
}

impl AssignmentKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Local => "local",
            Self::Alias => "alias",
        }
    }
}

/// `export NAME=value`, `local NAME=value`, `alias NAME=value` or `NAME=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub span: Span,
    /// None for a keyword-less `NAME=value`
    pub kind: Option<AssignmentKind>,
    pub target: String,
    /// None only for a bare `export NAME`
    pub value: Option<Expression>,
}

/// `if <condition>; then ...; fi`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub span: Span,
    pub condition: Expression,
    pub then: Vec<Statement>,
}

/// `function name() { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub span: Span,
    pub name: String,
    pub body: Vec<Statement>,
}

/// Which category a called name was registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    /// Supplied by the caller, assumed present in the xonsh environment
    ExtraBuiltin,
    /// A zsh builtin with a fixed translation (e.g. `echo`)
    StandardBuiltin,
    /// Declared earlier in the same script with `function`
    UserDefinedFunction,
}

/// `name arg1 arg2 ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub span: Span,
    pub name: String,
    pub args: Vec<Expression>,
    pub kind: InvocationKind,
}
