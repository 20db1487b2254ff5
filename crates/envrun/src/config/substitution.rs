//! Substitution engine for `${NAME}` and `${NAME|default}` placeholders

use crate::config::environment::Environment;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regex for matching placeholders: ${inner}
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

/// Separator between the reference name and its default value
const DEFAULT_SEPARATOR: char = '|';

/// Result of resolving a set of values
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    /// Values with all resolvable placeholders replaced
    pub env: Environment,
    /// Placeholders that were left unchanged
    pub issues: Vec<SubstitutionError>,
}

/// Resolve the placeholders of every value in `values` against `lookup`.
///
/// Keys are kept as they are. Placeholders that cannot be resolved are left
/// verbatim and reported in [`Resolved::issues`].
pub fn resolve(values: &Environment, lookup: &Environment) -> Resolved {
    let mut resolved = Resolved::default();

    for (key, value) in values {
        let (value, issues) = resolve_value(value, lookup);
        resolved.env.insert(key.clone(), value);
        resolved.issues.extend(issues);
    }

    resolved
}

/// Perform a single substitution pass over one value.
///
/// Substituted text is not scanned again.
pub fn resolve_value(input: &str, lookup: &Environment) -> (String, Vec<SubstitutionError>) {
    let mut issues = Vec::new();

    let result = PLACEHOLDER_PATTERN.replace_all(input, |caps: &Captures| {
        match resolve_capture(caps, lookup) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}", e);
                let placeholder = e.placeholder().to_string();
                issues.push(e);
                placeholder
            }
        }
    });

    (result.into_owned(), issues)
}

/// Resolve a single placeholder capture
fn resolve_capture(caps: &Captures, lookup: &Environment) -> Result<String, SubstitutionError> {
    let placeholder = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
    let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    let (name, default) = match inner.split_once(DEFAULT_SEPARATOR) {
        Some((name, default)) => (name, Some(default)),
        None => (inner, None),
    };

    if name.is_empty() {
        return Err(SubstitutionError::Malformed(placeholder.to_string()));
    }

    if let Some(value) = lookup.get(name) {
        return Ok(value.to_string());
    }

    match default {
        Some(default) if !default.is_empty() => Ok(default.to_string()),
        _ => Err(SubstitutionError::Undefined {
            name: name.to_string(),
            placeholder: placeholder.to_string(),
        }),
    }
}

/// Placeholders that could not be substituted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstitutionError {
    #[error("Unresolved variable '{name}' and no default value was defined: \"{placeholder}\"")]
    Undefined { name: String, placeholder: String },

    #[error("Empty variable name in placeholder: \"{0}\"")]
    Malformed(String),
}

impl SubstitutionError {
    /// The placeholder text as it appeared in the value
    pub fn placeholder(&self) -> &str {
        match self {
            SubstitutionError::Undefined { placeholder, .. } => placeholder,
            SubstitutionError::Malformed(placeholder) => placeholder,
        }
    }
}
