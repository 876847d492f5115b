//! Translator Settings
//!
//! Which exported variables get type-preserving assignment, and how the
//! emitted script is wrapped. Loadable from TOML; CLI flags override.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Options for the translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preserve the type of every exported variable, not just path-like ones
    pub strict_env_types: bool,
    /// Path-like variables whose names do not end in `PATH`
    pub other_path_like_vars: BTreeSet<String>,
    /// Module the bootstrap preamble imports `init_context` from
    pub runtime_module: String,
    /// Wrap the output in a preamble that creates `ctx`
    pub emit_preamble: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict_env_types: false,
            other_path_like_vars: ["BASH_COMPLETIONS".to_string()].into_iter().collect(),
            runtime_module: "zsh2xonsh.runtime".to_string(),
            emit_preamble: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Should `name` be treated like `$PATH` (a list in xonsh)?
    ///
    /// True for any name ending in `PATH` and for the configured extras.
    pub fn is_path_like_var(&self, name: &str) -> bool {
        name.ends_with("PATH") || self.other_path_like_vars.contains(name)
    }

    /// Does an `export` of `name` need the runtime's type-preserving assignment?
    pub fn needs_typed_assignment(&self, name: &str) -> bool {
        self.strict_env_types || self.is_path_like_var(name)
    }
}
