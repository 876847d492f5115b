//! Recursive Descent Parser for the zsh subset
//!
//! Statements are dispatched on their leading word through the parser's own
//! [`DispatchTable`]. Anything the table does not know must be a keyword-less
//! `NAME=value` assignment, otherwise parsing fails.
//!
//! Grammar:
//!   script      ::= (statement [;])*
//!   statement   ::= assignment | conditional | function | invocation
//!   assignment  ::= (export|local|alias)? WORD [= value_expr]
//!   conditional ::= if command_expr ; then statement* fi
//!   function    ::= function WORD ( ) { statement* }
//!   invocation  ::= NAME value_expr*

use crate::ast::types::{
    Assignment, AssignmentKind, Conditional, Expression, FunctionDeclaration, Invocation,
    InvocationKind, Span, Statement,
};
use crate::parser::cursor::{Cursor, Matcher};
use crate::parser::dispatch::{is_unsupported_keyword, DispatchTable, RegisterError, Rule};
use crate::parser::expression_parser::parse_expression;
use crate::parser::types::{
    ExpressionContext, ParseResult, TranslationError, EMPTY_PARAMS_PATTERN,
};

/// Parse a whole script into top-level statements.
///
/// Either every statement parses or nothing is returned.
pub fn parse(source: &str, extra_builtins: &[String]) -> ParseResult<Vec<Statement>> {
    let mut parser = Parser::new(Cursor::from_source(source), extra_builtins)?;
    parser.parse_all()
}

/// Main parser struct
pub struct Parser {
    cursor: Cursor,
    dispatch: DispatchTable,
}

impl Parser {
    /// Create a parser over `cursor`, registering each extra builtin.
    pub fn new(cursor: Cursor, extra_builtins: &[String]) -> ParseResult<Self> {
        let mut dispatch = DispatchTable::new();
        for name in extra_builtins {
            dispatch
                .register(name, InvocationKind::ExtraBuiltin)
                .map_err(|err| match err {
                    RegisterError::InvalidName => TranslationError::translate(
                        format!("Invalid extra builtin name {:?}", name),
                        None,
                    ),
                    RegisterError::Conflict(_) => TranslationError::translate(
                        format!("The extra builtin {:?} conflicts with a builtin", name),
                        None,
                    ),
                })?;
        }
        Ok(Parser { cursor, dispatch })
    }

    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    /// Functions declared so far in this parse
    pub fn declared_functions(&self) -> impl Iterator<Item = &str> {
        self.dispatch.names_of(InvocationKind::UserDefinedFunction)
    }

    pub fn parse_all(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while let Some(stmt) = self.statement()? {
            statements.push(stmt);
        }
        Ok(statements)
    }

    // ===========================================================================
    // STATEMENTS
    // ===========================================================================

    /// Parse one statement and an optional trailing `;`.
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn statement(&mut self) -> ParseResult<Option<Statement>> {
        let Some(stmt) = self.statement_inner()? else {
            return Ok(None);
        };
        let spaced = self.cursor.skip_whitespace();
        let comment = spaced && self.cursor.skip_comment();
        if !comment && !self.cursor.eat(";") && !self.cursor.at_line_end() {
            let rest = self.cursor.remaining().unwrap_or("");
            return Err(TranslationError::parse(
                format!("Unexpected trailing text {:?} after {}", rest, stmt.kind_name()),
                self.cursor.location(),
            ));
        }
        Ok(Some(stmt))
    }

    fn statement_inner(&mut self) -> ParseResult<Option<Statement>> {
        self.cursor.skip_blank_and_comment_lines();
        if self.cursor.is_eof() {
            return Ok(None);
        }
        let start = self.cursor.location();
        let first_word = self.cursor.peek_word().unwrap_or_default();
        if first_word.is_empty() {
            let found = self.cursor.remaining().and_then(|r| r.chars().next());
            return Err(TranslationError::parse(
                format!(
                    "Expected a statement, found `{}`",
                    found.map(String::from).unwrap_or_default()
                ),
                start,
            ));
        }

        let stmt = match self.dispatch.get(&first_word) {
            Some(Rule::Assignment(kind)) => self.assignment(Some(kind))?,
            Some(Rule::Conditional) => self.conditional()?,
            Some(Rule::FunctionDeclaration) => self.function_declaration()?,
            Some(Rule::Invocation(kind)) => self.invocation(kind)?,
            None if is_unsupported_keyword(&first_word) => {
                return Err(TranslationError::unsupported(
                    format!("Unsupported construct `{}`", first_word),
                    start,
                ));
            }
            None => self.assignment(None)?,
        };
        Ok(Some(stmt))
    }

    /// `export|local|alias NAME[=value]` or keyword-less `NAME=value`
    fn assignment(&mut self, kind: Option<AssignmentKind>) -> ParseResult<Statement> {
        let start = self.cursor.location();
        if kind.is_some() {
            self.cursor.take_word();
            self.cursor.skip_whitespace();
        }
        let target = self.cursor.take_word().unwrap_or_default();
        if target.is_empty() {
            return Err(TranslationError::parse(
                format!(
                    "Expected a variable name after `{}`",
                    kind.map_or("", |k| k.keyword())
                ),
                self.cursor.location(),
            ));
        }
        self.cursor.skip_whitespace();

        let value = if self.cursor.eat("=") {
            if self.cursor.remaining().map_or(false, |r| r.starts_with(char::is_whitespace)) {
                return Err(TranslationError::parse(
                    format!("Unexpected whitespace after `{}=`", target),
                    self.cursor.location(),
                ));
            }
            parse_expression(&mut self.cursor, ExpressionContext::Value, true)?
        } else {
            match kind {
                Some(AssignmentKind::Export) => None,
                Some(_) => {
                    return Err(TranslationError::parse("Expected an `=`", self.cursor.location()))
                }
                None => {
                    let found = self
                        .cursor
                        .remaining()
                        .and_then(|r| r.chars().next())
                        .map(String::from)
                        .unwrap_or_else(|| "end of line".to_string());
                    return Err(TranslationError::parse(
                        format!("Unexpected char `{}` after {:?}", found, target),
                        self.cursor.location(),
                    ));
                }
            }
        };

        Ok(Statement::Assignment(Assignment {
            span: Span::new(start, self.cursor.location()),
            kind,
            target,
            value,
        }))
    }

    /// `if <command>; then <statements> fi`
    fn conditional(&mut self) -> ParseResult<Statement> {
        let start = self.cursor.location();
        self.expect_word("if")?;
        let condition = self.required_expression(ExpressionContext::Command)?;
        self.cursor.skip_whitespace();
        if !self.cursor.eat(";") {
            return Err(TranslationError::parse("Expected a semicolon", self.cursor.location()));
        }
        self.cursor.skip_blank_and_comment_lines();
        self.expect_word("then")?;

        let mut then = Vec::new();
        loop {
            self.cursor.skip_blank_and_comment_lines();
            if self.cursor.is_eof() {
                return Err(TranslationError::parse(
                    "Expected `fi` to close conditional",
                    start,
                ));
            }
            let word = self.cursor.peek_word().unwrap_or_default();
            match word.as_str() {
                "else" | "elif" => {
                    return Err(TranslationError::unsupported(
                        format!("Unsupported conditional operation `{}`", word),
                        self.cursor.location(),
                    ));
                }
                "fi" => {
                    self.cursor.take_word();
                    break;
                }
                _ => {
                    if let Some(stmt) = self.statement()? {
                        then.push(stmt);
                    }
                }
            }
        }

        Ok(Statement::Conditional(Conditional {
            span: Span::new(start, self.cursor.location()),
            condition,
            then,
        }))
    }

    /// `function NAME() { <statements> }`
    fn function_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.cursor.location();
        self.expect_word("function")?;
        self.cursor.skip_whitespace();
        let name = self.cursor.take_word().unwrap_or_default();
        if name.is_empty() {
            return Err(TranslationError::parse(
                "Expected a name for the function",
                self.cursor.location(),
            ));
        }
        if self.dispatch.contains(&name) {
            return Err(TranslationError::unsupported(
                format!("Defining {:?} conflicts with existing builtin/statement", name),
                start,
            ));
        }
        self.cursor.skip_whitespace();
        let params = self
            .cursor
            .take_while(Matcher::Pattern(&EMPTY_PARAMS_PATTERN))
            .unwrap_or("");
        if params.is_empty() {
            return Err(TranslationError::parse(
                format!("Expected opening parens () for function declaration {:?}", name),
                self.cursor.location(),
            ));
        }
        self.cursor.skip_blank_and_comment_lines();
        if !self.cursor.eat("{") {
            return Err(TranslationError::parse("Expected opening brace", self.cursor.location()));
        }

        let mut body = Vec::new();
        loop {
            self.cursor.skip_blank_and_comment_lines();
            if self.cursor.is_eof() {
                return Err(TranslationError::parse(
                    format!("Expected closing brace for function {:?}", name),
                    start,
                ));
            }
            if self.cursor.eat("}") {
                break;
            }
            if let Some(stmt) = self.statement()? {
                body.push(stmt);
            }
        }
        let end = self.cursor.location();

        self.dispatch
            .register(&name, InvocationKind::UserDefinedFunction)
            .map_err(|_| {
                TranslationError::unsupported(
                    format!("Defining {:?} conflicts with existing builtin/statement", name),
                    start,
                )
            })?;

        Ok(Statement::FunctionDeclaration(FunctionDeclaration {
            span: Span::new(start, end),
            name,
            body,
        }))
    }

    /// `NAME arg...` for a registered name
    fn invocation(&mut self, kind: InvocationKind) -> ParseResult<Statement> {
        let start = self.cursor.location();
        let name = self.cursor.take_word().unwrap_or_default();
        let mut end = self.cursor.location();
        let mut args = Vec::new();
        while let Some(arg) = parse_expression(&mut self.cursor, ExpressionContext::Value, false)? {
            args.push(arg);
            end = self.cursor.location();
            // `foo"bar"` is one word in zsh, not two arguments
            let separated = self
                .cursor
                .remaining()
                .and_then(|r| r.chars().next())
                .map_or(true, |c| c.is_whitespace() || c == ';');
            if !separated {
                return Err(TranslationError::parse(
                    format!("Expected whitespace after argument {} of {:?}", args.len(), name),
                    end,
                ));
            }
        }
        Ok(Statement::Invocation(Invocation {
            span: Span::new(start, end),
            name,
            args,
            kind,
        }))
    }

    // ===========================================================================
    // HELPER METHODS
    // ===========================================================================

    fn expect_word(&mut self, expected: &str) -> ParseResult<()> {
        self.cursor.skip_whitespace();
        let location = self.cursor.location();
        match self.cursor.take_word() {
            Some(word) if word == expected => Ok(()),
            other => Err(TranslationError::parse(
                format!(
                    "Expected `{}`, but got {:?}",
                    expected,
                    other.unwrap_or_default()
                ),
                location,
            )),
        }
    }

    fn required_expression(&mut self, ctx: ExpressionContext) -> ParseResult<Expression> {
        let location = self.cursor.location();
        parse_expression(&mut self.cursor, ctx, true)?
            .ok_or_else(|| TranslationError::parse("Expected an expression", location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::Location;
    use crate::parser::types::ErrorKind;

    fn parse_ok(src: &str) -> Vec<Statement> {
        parse(src, &[]).unwrap()
    }

    fn parse_err(src: &str) -> TranslationError {
        parse(src, &[]).unwrap_err()
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("\n  # just a comment\n\n").is_empty());
    }

    #[test]
    fn test_export_assignment() {
        let stmts = parse_ok("export PATH=$(echo /extra:$PATH)");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Statement::Assignment(a) => {
                assert_eq!(a.kind, Some(AssignmentKind::Export));
                assert_eq!(a.target, "PATH");
                assert!(matches!(a.value, Some(Expression::Subcommand(_))));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_export() {
        match &parse_ok("export EDITOR")[0] {
            Statement::Assignment(a) => {
                assert_eq!(a.target, "EDITOR");
                assert!(a.value.is_none());
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_local_requires_value() {
        let err = parse_err("local x");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.message(), "Expected an `=`");
    }

    #[test]
    fn test_keywordless_assignment() {
        match &parse_ok("foo=bar")[0] {
            Statement::Assignment(a) => {
                assert_eq!(a.kind, None);
                assert_eq!(a.target, "foo");
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_word_is_unexpected_char() {
        let err = parse_err("ls -la");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.message().contains("Unexpected char `-`"));
        assert!(err.message().contains("\"ls\""));
    }

    #[test]
    fn test_statements_separated_by_semicolons() {
        let stmts = parse_ok("local a=1; local b=2;\nexport C=3");
        assert_eq!(stmts.len(), 3);
    }

    #[test]
    fn test_trailing_text_is_rejected() {
        let err = parse_err("export A=1 B=2");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.location(), Some(Location::new(1, 11)));
    }

    #[test]
    fn test_trailing_comment_is_allowed() {
        assert_eq!(parse_ok("export A=1 # why not").len(), 1);
    }

    #[test]
    fn test_hash_after_word_is_not_a_comment() {
        let err = parse_err("export A=foo#bar");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.location(), Some(Location::new(1, 12)));
        let err = parse_err("echo a#b");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_whitespace_after_equals_is_rejected() {
        let err = parse_err("export A= B");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.location(), Some(Location::new(1, 9)));
    }

    #[test]
    fn test_arguments_must_be_separated() {
        for src in ["echo foo\"bar\"", "echo $(a)b", "echo 'a'b"] {
            let err = parse_err(src);
            assert_eq!(err.kind(), ErrorKind::Parse, "{src:?}");
        }
        assert_eq!(parse_ok("echo a 'b';echo c").len(), 2);
    }

    #[test]
    fn test_conditional_single_line() {
        let stmts = parse_ok("if [[ -f foo ]]; then echo bar; fi");
        match &stmts[0] {
            Statement::Conditional(c) => {
                match &c.condition {
                    Expression::Test(t) => assert_eq!(t.text, "[[ -f foo ]]"),
                    other => panic!("expected test, got {:?}", other),
                }
                assert_eq!(c.then.len(), 1);
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_preserves_order() {
        let src = "if [[ -d /opt ]]; then\n  export A=1\n  local b=2\n  echo done\nfi";
        match &parse_ok(src)[0] {
            Statement::Conditional(c) => {
                let kinds: Vec<_> = c.then.iter().map(Statement::kind_name).collect();
                assert_eq!(kinds, vec!["assignment", "assignment", "invocation"]);
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_rejects_elif_and_else() {
        let err = parse_err("if [[ -f a ]]; then\n echo a\nelif [[ -f b ]]; then\n echo b\nfi");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.location(), Some(Location::new(3, 0)));
        let err = parse_err("if [[ -f a ]]; then echo a; else echo b; fi");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_conditional_requires_semicolon_and_fi() {
        assert_eq!(parse_err("if [[ -f a ]] then echo a; fi").message(), "Expected a semicolon");
        let err = parse_err("if [[ -f a ]]; then\n echo a\n");
        assert_eq!(err.message(), "Expected `fi` to close conditional");
    }

    #[test]
    fn test_command_condition() {
        match &parse_ok("if command -v brew >/dev/null; then echo yes; fi")[0] {
            Statement::Conditional(c) => match &c.condition {
                Expression::Test(t) => assert_eq!(t.text, "command -v brew >/dev/null"),
                other => panic!("expected test, got {:?}", other),
            },
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration_registers_name() {
        let src = "function greet() {\n  echo hello\n}\ngreet world";
        let stmts = parse_ok(src);
        assert_eq!(stmts.len(), 2);
        match &stmts[1] {
            Statement::Invocation(inv) => {
                assert_eq!(inv.name, "greet");
                assert_eq!(inv.kind, InvocationKind::UserDefinedFunction);
                assert_eq!(inv.args.len(), 1);
            }
            other => panic!("expected invocation, got {:?}", other),
        }
    }

    #[test]
    fn test_function_params_allow_whitespace() {
        assert_eq!(parse_ok("function f( ) { echo x; }").len(), 1);
        let err = parse_err("function f(x) { echo x; }");
        assert!(err.message().starts_with("Expected opening parens"));
    }

    #[test]
    fn test_function_name_collision() {
        let err = parse_err("function echo() {\n}");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        let err = parse_err("function f() {\n}\nfunction f() {\n}");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.location(), Some(Location::new(3, 0)));
    }

    #[test]
    fn test_registration_is_per_parse() {
        parse_ok("function only_once() {\n}");
        let err = parse_err("only_once");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_extra_builtins() {
        let extras = vec!["source_env".to_string()];
        let stmts = parse("source_env ~/.env 'x y'", &extras).unwrap();
        match &stmts[0] {
            Statement::Invocation(inv) => {
                assert_eq!(inv.kind, InvocationKind::ExtraBuiltin);
                assert_eq!(inv.args.len(), 2);
            }
            other => panic!("expected invocation, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_builtin_collision() {
        let err = parse("", &["echo".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Translate);
        let err = parse("", &["bad-name".to_string()]).unwrap_err();
        assert!(err.message().contains("Invalid extra builtin"));
    }

    #[test]
    fn test_unsupported_keywords() {
        let err = parse_err("for x in a b; do echo $x; done");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_declared_functions() {
        let mut parser =
            Parser::new(Cursor::from_source("function a() {\n}\nfunction b() {\n}"), &[]).unwrap();
        parser.parse_all().unwrap();
        let names: Vec<_> = parser.declared_functions().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_spans_are_monotonic() {
        let stmts = parse_ok("export A=1\nif [[ -f x ]]; then\n  echo y\nfi");
        let mut last = Location::new(0, 0);
        for stmt in &stmts {
            let span = stmt.span();
            assert!(span.start <= span.end);
            assert!(last <= span.start);
            last = span.end;
        }
    }
}
