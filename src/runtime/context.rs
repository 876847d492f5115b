//! Execution Context
//!
//! The `ctx` object generated code talks to. A [`Runtime`] owns the shell
//! backend, the typed environment and the alias table; each [`Context`] is
//! one execution scope (the top level or a function call) with its own
//! locals and positional parameters. Scopes form a parent-linked chain and
//! lookups fall back to the parent on a miss. A child scope lives exactly as
//! long as the call that created it.

use std::cell::{Ref, RefCell};

use indexmap::IndexMap;

use crate::runtime::env::EnvStore;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::shell::ShellBackend;
use crate::runtime::typed::{splice_path, TypedValue, VarKind};

/// Variables forced on every child zsh
const FAKE_ENV: &[(&str, &str)] = &[("SHELL", "/bin/zsh")];

/// What an alias name expands to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alias {
    /// Fixed argv, computed at translation time
    Words(Vec<String>),
    /// zsh text re-resolved on every invocation (globs depend on the cwd)
    Deferred(String),
}

/// Result of invoking an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasExpansion {
    /// Command line for the host to run
    Argv(Vec<String>),
    /// zsh already ran it; its captured output
    Output(Option<String>),
}

pub struct Runtime {
    shell: Box<dyn ShellBackend>,
    env: RefCell<Box<dyn EnvStore>>,
    aliases: RefCell<IndexMap<String, Alias>>,
}

impl Runtime {
    pub fn new(shell: Box<dyn ShellBackend>, env: Box<dyn EnvStore>) -> Self {
        Runtime {
            shell,
            env: RefCell::new(env),
            aliases: RefCell::new(IndexMap::new()),
        }
    }

    /// The top-level scope
    pub fn root(&self) -> Context<'_> {
        Context {
            runtime: self,
            parent: None,
            function: None,
            locals: IndexMap::new(),
            positional: Vec::new(),
        }
    }

    pub fn env(&self) -> Ref<'_, Box<dyn EnvStore>> {
        self.env.borrow()
    }

    pub fn alias(&self, name: &str) -> Option<Alias> {
        self.aliases.borrow().get(name).cloned()
    }
}

pub struct Context<'r> {
    runtime: &'r Runtime,
    parent: Option<&'r Context<'r>>,
    /// Function name for a call scope, None at top level
    function: Option<String>,
    /// Everything is kept as a string, since zsh only sees strings
    locals: IndexMap<String, String>,
    /// `$0 $1 ...`, handled apart from locals like zsh does
    positional: Vec<String>,
}

impl<'r> Context<'r> {
    // ===========================================================================
    // SCOPES
    // ===========================================================================

    /// Enter a function call: `$0` is the function name, then the call arguments.
    pub fn begin_function<'c>(&'c self, name: &str, args: &[String]) -> Context<'c> {
        let mut positional = Vec::with_capacity(args.len() + 1);
        positional.push(name.to_string());
        positional.extend(args.iter().cloned());
        tracing::trace!(function = name, args = args.len(), "entering scope");
        Context {
            runtime: self.runtime,
            parent: Some(self),
            function: Some(name.to_string()),
            locals: IndexMap::new(),
            positional,
        }
    }

    /// Run `body` inside a child scope. The scope is torn down however `body` exits.
    pub fn with_function<R>(
        &self,
        name: &str,
        args: &[String],
        body: impl FnOnce(&mut Context<'_>) -> R,
    ) -> R {
        let mut child = self.begin_function(name, args);
        body(&mut child)
    }

    /// Record `value` as a local of this scope and hand it back unchanged
    pub fn assign_local<V: ToString>(&mut self, name: &str, value: V) -> V {
        self.locals.insert(name.to_string(), value.to_string());
        value
    }

    pub fn local(&self, name: &str) -> Option<&str> {
        match self.locals.get(name) {
            Some(value) => Some(value.as_str()),
            None => self.parent.and_then(|parent| parent.local(name)),
        }
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Locals of the whole chain; inner scopes win
    fn resolved_locals(&self) -> IndexMap<String, String> {
        let mut resolved = match self.parent {
            Some(parent) => parent.resolved_locals(),
            None => IndexMap::new(),
        };
        resolved.extend(self.locals.iter().map(|(k, v)| (k.clone(), v.clone())));
        resolved
    }

    // ===========================================================================
    // RUNNING ZSH
    // ===========================================================================

    /// Run `command` in zsh and return its stdout minus one trailing newline.
    ///
    /// A syntax error is always raised. A non-zero exit is raised when
    /// `check` is set and otherwise turned into `Ok(None)`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn zsh(&self, command: &str, check: bool) -> RuntimeResult<Option<String>> {
        let shell = &self.runtime.shell;
        shell.check_syntax(command)?;

        let mut env = self.runtime.env.borrow().detype();
        for (name, value) in FAKE_ENV {
            env.insert(name.to_string(), value.to_string());
        }
        env.extend(self.resolved_locals());

        let output = shell.execute(command, &env, &self.positional)?;
        if !output.success() {
            if check {
                return Err(RuntimeError::Execution {
                    command: command.to_string(),
                    returncode: output.status,
                });
            }
            tracing::warn!(command, status = ?output.status, "zsh command failed, result discarded");
            return Ok(None);
        }
        let mut stdout = output.stdout;
        if stdout.ends_with('\n') {
            stdout.pop();
        }
        Ok(Some(stdout))
    }

    /// Exit status of a test command as a boolean. Syntax errors propagate.
    pub fn zsh_test_command(&self, test: &str) -> RuntimeResult<bool> {
        match self.zsh(test, true) {
            Ok(_) => Ok(true),
            Err(RuntimeError::Execution { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Let zsh expand the inside of a double-quoted string
    pub fn zsh_expand_quote(&self, quoted: &str) -> RuntimeResult<Option<String>> {
        self.zsh(&format!("echo \"{}\"", quoted), false)
    }

    /// Expand a leading `~` or `~/`. Other text is returned unchanged.
    pub fn expand_literal(&self, text: &str) -> String {
        let rest = match text.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return text.to_string(),
        };
        let home = self
            .runtime
            .env
            .borrow()
            .get("HOME")
            .map(|value| value.flatten())
            .ok()
            .or_else(|| std::env::var("HOME").ok());
        match home {
            Some(home) => format!("{}{}", home.trim_end_matches('/'), rest),
            None => text.to_string(),
        }
    }

    // ===========================================================================
    // ENVIRONMENT
    // ===========================================================================

    /// `export NAME` without a value: publish a local of that name, or make
    /// sure the variable exists.
    pub fn export_var(&self, name: &str) -> RuntimeResult<()> {
        if let Some(value) = self.local(name) {
            let value = TypedValue::Str(value.to_string());
            self.runtime.env.borrow_mut().set(name, value);
            return Ok(());
        }
        let exists = self.runtime.env.borrow().get(name).is_ok();
        if !exists {
            self.runtime.env.borrow_mut().set(name, TypedValue::Str(String::new()));
        }
        Ok(())
    }

    /// Assign a flat zsh string to `name`, keeping the type of the previous value.
    ///
    /// Unset or undetectable previous values get a plain string. Path lists
    /// are spliced. Other kinds parse the new text; if that fails the
    /// variable is demoted to a string rather than failing.
    pub fn assign_typed_var(&self, name: &str, new_value: &str) -> RuntimeResult<()> {
        let previous = match self.runtime.env.borrow().get(name) {
            Ok(value) => Some(value),
            Err(RuntimeError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        let typed = match previous.as_ref().and_then(|value| value.kind().map(|k| (value, k))) {
            None => TypedValue::Str(new_value.to_string()),
            Some((TypedValue::PathList(parts), VarKind::PathList)) => {
                TypedValue::PathList(self.splice_path_var(name, parts, new_value)?)
            }
            Some((_, kind)) => kind.parse(new_value).unwrap_or_else(|err| {
                tracing::debug!(var = name, %err, "demoting variable to str");
                TypedValue::Str(new_value.to_string())
            }),
        };
        self.runtime.env.borrow_mut().set(name, typed);
        Ok(())
    }

    /// Compare against what zsh sees right now, not a cached copy
    fn splice_path_var(&self, name: &str, current: &[String], new_path: &str) -> RuntimeResult<Vec<String>> {
        let command = format!("echo \"${}\"", name);
        let old_path = self.zsh(&command, true)?.unwrap_or_default();
        let mut target = current.to_vec();
        splice_path(name, &mut target, &old_path, new_path)?;
        Ok(target)
    }

    // ===========================================================================
    // ALIASES
    // ===========================================================================

    /// An alias whose body zsh resolves each time it is invoked
    pub fn zsh_impl_complex_alias(&self, body: &str) -> Alias {
        Alias::Deferred(body.to_string())
    }

    pub fn define_alias(&self, name: &str, alias: Alias) {
        self.runtime.aliases.borrow_mut().insert(name.to_string(), alias);
    }

    pub fn run_alias(&self, name: &str, args: &[String]) -> RuntimeResult<AliasExpansion> {
        match self.runtime.alias(name) {
            Some(Alias::Words(mut words)) => {
                words.extend(args.iter().cloned());
                Ok(AliasExpansion::Argv(words))
            }
            Some(Alias::Deferred(body)) => {
                let mut command = body;
                for arg in args {
                    command.push(' ');
                    command.push_str(&quote_into_shell_string(arg));
                }
                Ok(AliasExpansion::Output(self.zsh(&command, false)?))
            }
            None => Err(RuntimeError::NotFound(format!("alias {}", name))),
        }
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        if let Some(function) = &self.function {
            tracing::trace!(function = %function, locals = self.locals.len(), "leaving scope");
        }
        self.locals.clear();
    }
}

/// Single-quote `s` for zsh. Nothing is special inside single quotes, so an
/// embedded `'` closes the quote, adds an escaped quote and reopens.
pub fn quote_into_shell_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
