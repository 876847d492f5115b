//! Typed Environment Store
//!
//! The interface to the host shell's typed environment. [`MemoryEnv`] keeps
//! everything in process and is what the tests and the fallback host use.

use indexmap::IndexMap;

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::typed::TypedValue;

pub trait EnvStore {
    /// Typed value of `name`. Fails with [`RuntimeError::NotFound`] if unset.
    fn get(&self, name: &str) -> RuntimeResult<TypedValue>;

    fn set(&mut self, name: &str, value: TypedValue);

    /// Every variable flattened to the string a child process would see
    fn detype(&self) -> IndexMap<String, String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
    vars: IndexMap<String, TypedValue>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment. Variables ending in
    /// `PATH` become path lists, everything else a string.
    pub fn from_process_env() -> Self {
        let vars = std::env::vars()
            .map(|(name, value)| {
                let typed = if name.ends_with("PATH") {
                    TypedValue::PathList(
                        value
                            .split(':')
                            .filter(|part| !part.is_empty())
                            .map(str::to_string)
                            .collect(),
                    )
                } else {
                    TypedValue::Str(value)
                };
                (name, typed)
            })
            .collect();
        MemoryEnv { vars }
    }

    pub fn with(mut self, name: &str, value: TypedValue) -> Self {
        self.set(name, value);
        self
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, name: &str) -> RuntimeResult<TypedValue> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(name.to_string()))
    }

    fn set(&mut self, name: &str, value: TypedValue) {
        self.vars.insert(name.to_string(), value);
    }

    fn detype(&self) -> IndexMap<String, String> {
        self.vars
            .iter()
            .filter(|(_, value)| !matches!(value, TypedValue::Absent))
            .map(|(name, value)| (name.clone(), value.flatten()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing() {
        let env = MemoryEnv::new();
        assert!(matches!(env.get("NOPE"), Err(RuntimeError::NotFound(name)) if name == "NOPE"));
    }

    #[test]
    fn test_set_and_detype() {
        let env = MemoryEnv::new()
            .with("PATH", TypedValue::PathList(vec!["/usr/bin".into(), "/bin".into()]))
            .with("DEBUG", TypedValue::Bool(true))
            .with("UNSET_ME", TypedValue::Absent);
        let flat = env.detype();
        assert_eq!(flat.get("PATH").map(String::as_str), Some("/usr/bin:/bin"));
        assert_eq!(flat.get("DEBUG").map(String::as_str), Some("True"));
        assert!(!flat.contains_key("UNSET_ME"));
    }
}
