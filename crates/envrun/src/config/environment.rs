//! Environment value type, merging and composition

use crate::config::substitution::{resolve, Resolved};
use std::collections::hash_map;
use std::collections::HashMap;

/// Unordered set of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the environment of the current process.
    ///
    /// Entries whose name or value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        let mut env = Self::new();
        for (key, value) in std::env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => env.insert(key, value),
                (key, _) => {
                    log::warn!(
                        "Dropping non-unicode environment variable from the child environment: {:?}",
                        key
                    );
                }
            }
        }
        env
    }

    /// Add a variable, replacing any previous value
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.vars.iter()
    }

    /// Variables sorted by name, for stable output
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut vars: Vec<_> = self
            .vars
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        vars.sort();
        vars
    }

    /// Combine two environments into a new one.
    ///
    /// Every key of either side is present; on collision the value from
    /// `overrides` wins. Neither input is modified.
    pub fn merge(&self, overrides: &Environment) -> Environment {
        let mut vars = HashMap::with_capacity(self.len() + overrides.len());
        vars.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars.extend(overrides.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        Environment { vars }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Environment::new();
        for (k, v) in iter {
            env.insert(k, v);
        }
        env
    }
}

impl IntoIterator for Environment {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

/// Which side wins when the definitions file and the ambient environment
/// define the same variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precedence {
    /// Definitions file values win (default)
    #[default]
    FileWins,
    /// Ambient values win, but file values may still reference them
    AmbientWins,
}

impl Precedence {
    /// Map the `--override` switch to a precedence
    pub fn from_override(override_ambient: bool) -> Self {
        if override_ambient {
            Precedence::AmbientWins
        } else {
            Precedence::FileWins
        }
    }
}

/// Build the final child environment from the file and ambient environments.
///
/// With [`Precedence::FileWins`] the two are merged first (file wins) and the
/// result is resolved against itself. With [`Precedence::AmbientWins`] the
/// file values are resolved against the ambient environment first, then the
/// ambient environment is merged on top.
pub fn compose(file: &Environment, ambient: &Environment, precedence: Precedence) -> Resolved {
    match precedence {
        Precedence::FileWins => {
            let merged = ambient.merge(file);
            resolve(&merged, &merged)
        }
        Precedence::AmbientWins => {
            let Resolved { env, issues } = resolve(file, ambient);
            Resolved {
                env: env.merge(ambient),
                issues,
            }
        }
    }
}
