//! Binding of tokenized values onto an options object.
//!
//! Binding runs in three steps:
//!
//! 1. [`build_option_map`] merges declared defaults, environment variables
//!    and command-line values into one raw [`OptionMap`] (command line wins).
//! 2. [`check_rules`] enforces per-field rules (required, pattern, choices)
//!    against the raw map.
//! 3. [`bind`] hands each value that names a field to [`Options::set`],
//!    which coerces it into the field type.

use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{OptionMap, OptionValue, Options, ParsedArgs, Schema};

/// A value could not be stored in its declared field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The raw value does not convert into the field type.
    #[error("invalid value {value:?} for {field}: expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },
    /// An [`Options`] implementation rejected the value.
    #[error("cannot set {field}: {message}")]
    Rejected { field: String, message: String },
}

impl BindError {
    /// Builds a [`BindError::Rejected`].
    pub fn rejected(field: &str, message: impl Into<String>) -> Self {
        BindError::Rejected {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A field-level rule that the raw option map breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldViolation {
    /// A required field has no value.
    #[error("{field}: value is required")]
    Missing { field: String },
    /// A value does not match the field pattern.
    #[error("{field}: value {value:?} does not match {pattern}")]
    PatternMismatch {
        field: String,
        value: String,
        pattern: String,
    },
    /// A value is not one of the allowed choices.
    #[error("{field}: value {value:?} is not one of [{}]", .choices.join(", "))]
    InvalidChoice {
        field: String,
        value: String,
        choices: Vec<String>,
    },
}

impl FieldViolation {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            FieldViolation::Missing { field }
            | FieldViolation::PatternMismatch { field, .. }
            | FieldViolation::InvalidChoice { field, .. } => field,
        }
    }
}

/// Builds the raw pre-bind map for one invocation.
///
/// Sources are layered from lowest to highest precedence: declared
/// defaults, then `env`, then the tokenized command line. Every environment
/// entry is kept under its own name; entries that feed a field (through
/// [`with_env`](crate::OptionField::with_env) or an identical key) are also
/// stored under the field key. Positional values are stored under their
/// index (`"0"`, `"1"`, ...) and, when declared, under the field key.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let schema = extract_schema_from_fields(vec![
///     OptionField::value("token", ValueKind::String).with_env("APP_TOKEN"),
///     OptionField::value("region", ValueKind::String).with_default("eu"),
/// ]).unwrap();
///
/// let parsed = tokenize(&["--token", "cli"], &schema);
/// let env = vec![("APP_TOKEN".to_string(), "env".to_string())];
/// let map = build_option_map(&parsed, &schema, &env);
///
/// assert_eq!(map["token"], OptionValue::from("cli"));
/// assert_eq!(map["APP_TOKEN"], OptionValue::from("env"));
/// assert_eq!(map["region"], OptionValue::from("eu"));
/// ```
pub fn build_option_map(
    parsed: &ParsedArgs,
    schema: &Schema,
    env: &[(String, String)],
) -> OptionMap {
    let mut map = OptionMap::new();

    for entry in schema.entries() {
        if let Some(default) = &entry.field.default {
            map.insert(entry.key.clone(), OptionValue::from(default.as_str()));
        }
    }

    for (name, value) in env {
        map.insert(name.clone(), OptionValue::from(value.as_str()));
        if let Some(entry) = schema.by_env(name) {
            trace!(variable = %name, field = %entry.key, "environment feeds field");
            map.insert(entry.key.clone(), OptionValue::from(value.as_str()));
        }
    }

    for (index, value) in &parsed.positionals {
        map.insert(index.to_string(), OptionValue::from(value.as_str()));
        if let Some(entry) = schema.positional(*index) {
            map.insert(entry.key.clone(), OptionValue::from(value.as_str()));
        }
    }

    for (key, value) in &parsed.named {
        map.insert(key.clone(), value.clone());
    }

    map
}

/// Checks the declared field rules against a raw map.
///
/// # Errors
///
/// Returns every violation found, in schema order.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let schema = extract_schema_from_fields(vec![
///     OptionField::value("name", ValueKind::String).required(),
///     OptionField::value("format", ValueKind::String).with_choices(&["json", "yaml"]),
/// ]).unwrap();
///
/// let mut map = OptionMap::new();
/// map.insert("format".into(), OptionValue::from("xml"));
///
/// let violations = check_rules(&schema, &map).unwrap_err();
/// assert_eq!(violations.len(), 2);
/// assert_eq!(violations[0].field(), "name");
/// ```
pub fn check_rules(schema: &Schema, map: &OptionMap) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();

    for entry in schema.entries() {
        let field = &entry.field;
        let Some(value) = map.get(&entry.key) else {
            if field.required {
                violations.push(FieldViolation::Missing {
                    field: entry.key.clone(),
                });
            }
            continue;
        };

        if let OptionValue::Flag(_) = value {
            continue;
        }
        let occurrences = value.clone().into_strings();

        if let Some(pattern) = &field.pattern {
            // patterns are validated at extraction time
            let Ok(regex) = Regex::new(pattern) else {
                continue;
            };
            for raw in occurrences.iter().filter(|raw| !regex.is_match(raw)) {
                violations.push(FieldViolation::PatternMismatch {
                    field: entry.key.clone(),
                    value: raw.clone(),
                    pattern: pattern.clone(),
                });
            }
        }

        if !field.choices.is_empty() {
            for raw in occurrences.iter().filter(|raw| !field.choices.contains(raw)) {
                violations.push(FieldViolation::InvalidChoice {
                    field: entry.key.clone(),
                    value: raw.clone(),
                    choices: field.choices.clone(),
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Stores every map value that names a schema field into `options`.
///
/// Fields are visited in schema order; keys that name no field are ignored.
///
/// # Errors
///
/// Returns the first [`BindError`] raised by [`Options::set`].
pub fn bind(options: &mut dyn Options, schema: &Schema, map: &OptionMap) -> Result<(), BindError> {
    let mut bound = 0usize;
    for entry in schema.entries() {
        if let Some(value) = map.get(&entry.key) {
            options.set(&entry.key, value)?;
            bound += 1;
        }
    }
    debug!(fields = bound, "bound options");
    Ok(())
}
