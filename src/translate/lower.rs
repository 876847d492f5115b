//! Lowering Rules
//!
//! Turns each syntax tree node into xonsh source. Lowering is pure: the same
//! node and settings always give the same text, and nodes are never modified.
//! Anything needing expansion (globs, variables, `~`, command output) is
//! deferred to the runtime context `ctx` of the generated code.

use crate::ast::types::{
    Assignment, AssignmentKind, Conditional, Expression, FunctionDeclaration, Invocation,
    InvocationKind, Statement,
};
use crate::parser::types::TranslationError;
use crate::translate::literals::{
    can_safely_be_split, is_simple_quoted, is_valid_integer, normalize_integer, py_repr,
};
use crate::translate::settings::Settings;

pub const INDENT: &str = "    ";

/// Name of the runtime context in generated code
pub const CTX: &str = "ctx";

/// How a zsh standard builtin is spelled in xonsh
const STANDARD_BUILTIN_MAP: &[(&str, &str)] = &[("echo", "print")];

pub type TranslateResult<T> = Result<T, TranslationError>;

pub struct Translator<'a> {
    settings: &'a Settings,
}

impl<'a> Translator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Translator { settings }
    }

    // ===========================================================================
    // EXPRESSIONS
    // ===========================================================================

    pub fn expression(&self, expr: &Expression) -> String {
        match expr {
            Expression::Literal(lit) => {
                if lit.text.starts_with('~') {
                    format!("{CTX}.expand_literal({})", py_repr(&lit.text))
                } else if is_valid_integer(&lit.text) {
                    normalize_integer(&lit.text)
                } else {
                    py_repr(&lit.text)
                }
            }
            Expression::Quoted(q) => {
                if is_simple_quoted(&q.inside_text) {
                    py_repr(&q.inside_text)
                } else {
                    format!("{CTX}.zsh_expand_quote({})", py_repr(&q.inside_text))
                }
            }
            Expression::Subcommand(sub) => format!("{CTX}.zsh({})", py_repr(&sub.command)),
            Expression::Test(test) => format!("{CTX}.zsh_test_command({})", py_repr(&test.text)),
        }
    }

    /// Like [`Self::expression`] but always yields a string. Typed assignment
    /// and alias argv both need the flat zsh value.
    fn string_expression(&self, expr: &Expression) -> String {
        match expr {
            Expression::Literal(lit) if !lit.text.starts_with('~') => py_repr(&lit.text),
            other => self.expression(other),
        }
    }

    // ===========================================================================
    // STATEMENTS
    // ===========================================================================

    pub fn statement(&self, stmt: &Statement) -> TranslateResult<String> {
        tracing::trace!(kind = stmt.kind_name(), start = %stmt.span().start, "lowering statement");
        match stmt {
            Statement::Assignment(a) => self.assignment(a),
            Statement::Conditional(c) => self.conditional(c),
            Statement::FunctionDeclaration(f) => self.function_declaration(f),
            Statement::Invocation(inv) => self.invocation(inv),
        }
    }

    fn assignment(&self, a: &Assignment) -> TranslateResult<String> {
        let target = &a.target;
        match (a.kind, &a.value) {
            (Some(AssignmentKind::Export), None) => {
                Ok(format!("{CTX}.export_var({})", py_repr(target)))
            }
            (Some(AssignmentKind::Export), Some(value)) => {
                if self.settings.needs_typed_assignment(target) {
                    Ok(format!(
                        "{CTX}.assign_typed_var({}, {})",
                        py_repr(target),
                        self.string_expression(value)
                    ))
                } else {
                    Ok(format!("${} = {}", target, self.expression(value)))
                }
            }
            (Some(AssignmentKind::Local) | None, Some(value)) => Ok(format!(
                "{} = {CTX}.assign_local({}, {})",
                target,
                py_repr(target),
                self.expression(value)
            )),
            (Some(AssignmentKind::Alias), Some(value)) => self.alias(a, value),
            (Some(kind), None) => Err(TranslationError::translate(
                format!("`{}` of {:?} has no value", kind.keyword(), target),
                Some(a.span.start),
            )),
            (None, None) => Err(TranslationError::translate(
                format!("Assignment to {:?} has no value", target),
                Some(a.span.start),
            )),
        }
    }

    fn alias(&self, a: &Assignment, value: &Expression) -> TranslateResult<String> {
        if !is_simple_quoted(&a.target) {
            return Err(TranslationError::translate(
                format!("Alias name {:?} is too complex", a.target),
                Some(a.span.start),
            ));
        }
        let implementation = match value {
            // TODO: `~` is expanded when the alias is defined, zsh expands it on use
            Expression::Literal(_) => format!("[{}]", self.string_expression(value)),
            Expression::Quoted(q) if can_safely_be_split(&q.inside_text) => {
                let words: Vec<String> = q.inside_text.split(' ').map(py_repr).collect();
                format!("[{}]", words.join(", "))
            }
            Expression::Quoted(q) => {
                format!("{CTX}.zsh_impl_complex_alias({})", py_repr(&q.inside_text))
            }
            Expression::Subcommand(_) | Expression::Test(_) => {
                return Err(TranslationError::translate(
                    "Don't know how to translate alias target",
                    Some(value.span().start),
                ));
            }
        };
        Ok(format!("aliases[{}] = {}", py_repr(&a.target), implementation))
    }

    fn conditional(&self, c: &Conditional) -> TranslateResult<String> {
        let mut lines = vec![format!("if {}:", self.expression(&c.condition))];
        lines.extend(self.block(&c.then, 1)?);
        Ok(lines.join("\n"))
    }

    /// A Python function taking `*args` plus the caller's context. The body
    /// runs inside a child scope whose `with` block tears it down on every
    /// exit path, exceptions included.
    fn function_declaration(&self, f: &FunctionDeclaration) -> TranslateResult<String> {
        let mut lines = vec![
            format!("def {}(*args, parent_ctx):", f.name),
            format!(
                "{INDENT}with parent_ctx.begin_function({}, args) as {CTX}:",
                py_repr(&f.name)
            ),
        ];
        lines.extend(self.block(&f.body, 2)?);
        Ok(lines.join("\n"))
    }

    fn invocation(&self, inv: &Invocation) -> TranslateResult<String> {
        let mut args: Vec<String> = inv.args.iter().map(|arg| self.expression(arg)).collect();
        let callee = match inv.kind {
            InvocationKind::ExtraBuiltin => inv.name.as_str(),
            InvocationKind::StandardBuiltin => STANDARD_BUILTIN_MAP
                .iter()
                .find(|(zsh, _)| *zsh == inv.name)
                .map(|(_, xonsh)| *xonsh)
                .ok_or_else(|| {
                    TranslationError::translate(
                        format!("Not yet implemented: Builtin {}", inv.name),
                        Some(inv.span.start),
                    )
                })?,
            InvocationKind::UserDefinedFunction => {
                args.push(format!("parent_ctx={CTX}"));
                inv.name.as_str()
            }
        };
        Ok(format!("{}({})", callee, args.join(", ")))
    }

    /// Lower `stmts` and indent every produced line by `depth` levels.
    /// An empty body becomes `pass`.
    fn block(&self, stmts: &[Statement], depth: usize) -> TranslateResult<Vec<String>> {
        let prefix = INDENT.repeat(depth);
        let mut lines = Vec::new();
        for stmt in stmts {
            for line in self.statement(stmt)?.lines() {
                lines.push(format!("{prefix}{line}"));
            }
        }
        if lines.is_empty() {
            lines.push(format!("{prefix}pass"));
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::parser::types::ErrorKind;

    fn lower_with(src: &str, settings: &Settings, extras: &[&str]) -> TranslateResult<String> {
        let extras: Vec<String> = extras.iter().map(|s| s.to_string()).collect();
        let stmts = parse(src, &extras)?;
        let translator = Translator::new(settings);
        let mut out = Vec::new();
        for stmt in &stmts {
            out.push(translator.statement(stmt)?);
        }
        Ok(out.join("\n"))
    }

    fn lower(src: &str) -> String {
        lower_with(src, &Settings::default(), &[]).unwrap()
    }

    #[test]
    fn test_literals() {
        assert_eq!(lower("local a=foo/bar"), "a = ctx.assign_local('a', 'foo/bar')");
        assert_eq!(lower("local a=1_000"), "a = ctx.assign_local('a', 1000)");
        assert_eq!(
            lower("local a=~/bin"),
            "a = ctx.assign_local('a', ctx.expand_literal('~/bin'))"
        );
    }

    #[test]
    fn test_literal_lowering_is_pure() {
        let settings = Settings::default();
        let translator = Translator::new(&settings);
        for src in ["local x=foo", "local x=foo/bar", "local x=12"] {
            let stmts = parse(src, &[]).unwrap();
            let first = translator.statement(&stmts[0]).unwrap();
            let second = translator.statement(&stmts[0]).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_quoted() {
        assert_eq!(lower("local a='foo-bar'"), "a = ctx.assign_local('a', 'foo-bar')");
        assert_eq!(
            lower("local a=\"$HOME/bin\""),
            "a = ctx.assign_local('a', ctx.zsh_expand_quote('$HOME/bin'))"
        );
    }

    #[test]
    fn test_export_path_like() {
        assert_eq!(
            lower("export PATH=$(echo /extra:$PATH)"),
            "ctx.assign_typed_var('PATH', ctx.zsh('echo /extra:$PATH'))"
        );
    }

    #[test]
    fn test_export_typed_passes_strings() {
        let settings = Settings {
            strict_env_types: true,
            ..Settings::default()
        };
        assert_eq!(
            lower_with("export DEPTH=3", &settings, &[]).unwrap(),
            "ctx.assign_typed_var('DEPTH', '3')"
        );
    }

    #[test]
    fn test_export_untyped() {
        assert_eq!(lower("export EDITOR=vim"), "$EDITOR = 'vim'");
        assert_eq!(lower("export EDITOR"), "ctx.export_var('EDITOR')");
    }

    #[test]
    fn test_local_and_plain_assignment() {
        assert_eq!(lower("local x=foo"), "x = ctx.assign_local('x', 'foo')");
        assert_eq!(lower("x=foo"), "x = ctx.assign_local('x', 'foo')");
    }

    #[test]
    fn test_alias_split() {
        assert_eq!(lower("alias foo='bar baz'"), "aliases['foo'] = ['bar', 'baz']");
        assert_eq!(lower("alias ll=ls"), "aliases['ll'] = ['ls']");
    }

    #[test]
    fn test_alias_words_are_strings() {
        assert_eq!(lower("alias x=12"), "aliases['x'] = ['12']");
        assert_eq!(
            lower("alias t=~/bin/tool"),
            "aliases['t'] = [ctx.expand_literal('~/bin/tool')]"
        );
    }

    #[test]
    fn test_alias_backslash_is_deferred() {
        assert_eq!(
            lower("alias x='echo a\\ b'"),
            "aliases['x'] = ctx.zsh_impl_complex_alias('echo a\\\\ b')"
        );
    }

    #[test]
    fn test_alias_glob_is_deferred() {
        assert_eq!(
            lower("alias foo='echo *.txt'"),
            "aliases['foo'] = ctx.zsh_impl_complex_alias('echo *.txt')"
        );
    }

    #[test]
    fn test_alias_subcommand_is_rejected() {
        let err = lower_with("alias foo=$(which bar)", &Settings::default(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Translate);
    }

    #[test]
    fn test_conditional() {
        assert_eq!(
            lower("if [[ -f foo ]]; then echo bar; fi"),
            "if ctx.zsh_test_command('[[ -f foo ]]'):\n    print('bar')"
        );
    }

    #[test]
    fn test_nested_conditionals_keep_order_and_indent() {
        let src = "if [[ -d /a ]]; then\n  echo one\n  if [[ -d /b ]]; then\n    echo two\n  fi\n  echo three\nfi";
        assert_eq!(
            lower(src),
            "if ctx.zsh_test_command('[[ -d /a ]]'):\n    print('one')\n    if ctx.zsh_test_command('[[ -d /b ]]'):\n        print('two')\n    print('three')"
        );
    }

    #[test]
    fn test_empty_conditional_body() {
        assert_eq!(
            lower("if [[ -f x ]]; then\nfi"),
            "if ctx.zsh_test_command('[[ -f x ]]'):\n    pass"
        );
    }

    #[test]
    fn test_function_declaration_and_call() {
        let src = "function greet() {\n  local who=world\n  echo hello\n}\ngreet there";
        assert_eq!(
            lower(src),
            "def greet(*args, parent_ctx):\n    with parent_ctx.begin_function('greet', args) as ctx:\n        who = ctx.assign_local('who', 'world')\n        print('hello')\ngreet('there', parent_ctx=ctx)"
        );
    }

    #[test]
    fn test_extra_builtin_call() {
        assert_eq!(
            lower_with("source_env ~/.env", &Settings::default(), &["source_env"]).unwrap(),
            "source_env(ctx.expand_literal('~/.env'))"
        );
    }

    #[test]
    fn test_echo_multiple_args() {
        assert_eq!(lower("echo a 'b c' 3"), "print('a', ctx.zsh_expand_quote('b c'), 3)");
    }
}
