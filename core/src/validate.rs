//! Schema declaration validation.
//!
//! Catches structural errors in an [`OptionField`] list before it is used
//! for tokenization: empty or malformed names, duplicate long names or short
//! aliases within one nesting level, duplicate positional slots, positional
//! groups and invalid patterns.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::*;
//!
//! let fields = vec![
//!     OptionField::flag("verbose").with_short("v"),
//!     OptionField::value("output", ValueKind::String).with_short("o"),
//! ];
//! assert!(validate_fields(&fields).is_empty());
//!
//! // Invalid: both fields claim the alias `v`
//! let bad = vec![
//!     OptionField::flag("verbose").with_short("v"),
//!     OptionField::flag("version").with_short("v"),
//! ];
//! assert_eq!(validate_fields(&bad), vec![SchemaError::DuplicateShort("v".into())]);
//! ```

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::schema::GROUP_SEPARATOR;
use crate::{OptionField, ValueKind};

/// Malformed schema declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field has an empty or whitespace-only long name.
    #[error("field name cannot be empty")]
    EmptyName,
    /// A name starts with the option prefix, contains whitespace, `=` or the
    /// group separator.
    #[error("invalid field name: {0}")]
    InvalidName(String),
    /// Two fields at one nesting level share a long name.
    #[error("duplicate field name in scope: {0}")]
    DuplicateName(String),
    /// Two fields at one nesting level share a short alias.
    #[error("duplicate short alias in scope: {0}")]
    DuplicateShort(String),
    /// Two fields claim the same positional slot.
    #[error("duplicate positional index: {0}")]
    DuplicatePosition(usize),
    /// A group or a field nested inside a group declares a positional index.
    #[error("positional index not allowed on group field: {0}")]
    PositionalGroup(String),
    /// A `with_pattern` regex does not compile.
    #[error("invalid pattern for field {field}: {message}")]
    InvalidPattern { field: String, message: String },
}

/// Validates a field declaration list.
///
/// Returns at most one error; the first problem found stops the walk.
pub fn validate_fields(fields: &[OptionField]) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut positions = HashSet::new();
    errors.extend(validate_scope(fields, 0, &mut positions));
    errors
}

fn validate_scope(
    fields: &[OptionField],
    depth: usize,
    positions: &mut HashSet<usize>,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen_long: HashSet<&str> = HashSet::new();
    let mut seen_short: HashSet<&str> = HashSet::new();

    for field in fields {
        let long = field.long.trim();
        if long.is_empty() {
            errors.push(SchemaError::EmptyName);
            return errors;
        }
        if !is_valid_name(&field.long) {
            errors.push(SchemaError::InvalidName(field.long.clone()));
            return errors;
        }
        if !seen_long.insert(long) {
            errors.push(SchemaError::DuplicateName(long.to_string()));
            return errors;
        }

        if let Some(short) = field.short.as_deref().filter(|s| !s.is_empty()) {
            if !is_valid_name(short) {
                errors.push(SchemaError::InvalidName(short.to_string()));
                return errors;
            }
            if !seen_short.insert(short) {
                errors.push(SchemaError::DuplicateShort(short.to_string()));
                return errors;
            }
        }

        if let Some(index) = field.position {
            if field.kind == ValueKind::Group || depth > 0 {
                errors.push(SchemaError::PositionalGroup(field.long.clone()));
                return errors;
            }
            if !positions.insert(index) {
                errors.push(SchemaError::DuplicatePosition(index));
                return errors;
            }
        }

        if let Some(pattern) = &field.pattern {
            if let Err(e) = Regex::new(pattern) {
                errors.push(SchemaError::InvalidPattern {
                    field: field.long.clone(),
                    message: e.to_string(),
                });
                return errors;
            }
        }

        if field.kind == ValueKind::Group {
            errors.extend(validate_scope(&field.fields, depth + 1, positions));
            if !errors.is_empty() {
                return errors;
            }
        }
    }

    errors
}

fn is_valid_name(name: &str) -> bool {
    !name.starts_with('-')
        && !name.contains('=')
        && !name.contains(GROUP_SEPARATOR)
        && !name.chars().any(char::is_whitespace)
}
