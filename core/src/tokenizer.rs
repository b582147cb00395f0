//! Token classification against a [`Schema`].
//!
//! [`tokenize`] walks the token sequence once, left to right, with one token
//! of lookahead, and sorts every token into exactly one bucket of
//! [`ParsedArgs`]:
//!
//! - prefixed keys that name a schema field (and their value token) go to
//!   [`named`](ParsedArgs::named), keyed by the field's canonical key;
//! - prefixed keys that name nothing go to
//!   [`unknown_options`](ParsedArgs::unknown_options), keyed by the bare key;
//! - bare tokens whose ordinal matches a declared positional slot go to
//!   [`positionals`](ParsedArgs::positionals);
//! - every other bare token goes to
//!   [`unknown_positionals`](ParsedArgs::unknown_positionals).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{OptionMap, OptionValue, Schema};

/// Marker that starts a named token.
pub const OPTION_PREFIX: char = '-';

/// Separator of the `--key=value` form.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Result of tokenizing one token sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedArgs {
    /// Declared positional values, by index among positional tokens.
    pub positionals: BTreeMap<usize, String>,
    /// Values of recognized keys, by canonical field key.
    pub named: OptionMap,
    /// Bare tokens with no declared slot, in input order.
    pub unknown_positionals: Vec<String>,
    /// Values of unrecognized keys, by bare key.
    pub unknown_options: OptionMap,
}

impl ParsedArgs {
    /// Returns `true` when no token was classified.
    pub fn is_empty(&self) -> bool {
        self.positionals.is_empty()
            && self.named.is_empty()
            && self.unknown_positionals.is_empty()
            && self.unknown_options.is_empty()
    }

    /// Returns the recorded value of a recognized key.
    pub fn named_value(&self, key: &str) -> Option<&OptionValue> {
        self.named.get(key)
    }
}

/// Classifies `tokens` against `schema`.
///
/// Boolean fields never consume the following token. Any other recognized
/// key consumes the next token as its value, or records an empty string when
/// it is the last token. Unrecognized keys follow the same consumption rule
/// but record `true` when no value token follows. Repeated keys fold into a
/// list in input order.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let schema = extract_schema_from_fields(vec![
///     OptionField::flag("help").with_short("h"),
///     OptionField::value("verbosity", ValueKind::Number).with_short("v"),
/// ]).unwrap();
///
/// let parsed = tokenize(&["init", "-v", "2", "--help", "beep", "--boop"], &schema);
///
/// assert_eq!(parsed.named["verbosity"], OptionValue::from("2"));
/// assert_eq!(parsed.named["help"], OptionValue::Flag(true));
/// assert_eq!(parsed.unknown_positionals, vec!["init", "beep"]);
/// assert_eq!(parsed.unknown_options["boop"], OptionValue::Flag(true));
/// ```
pub fn tokenize<S: AsRef<str>>(tokens: &[S], schema: &Schema) -> ParsedArgs {
    let mut parsed = ParsedArgs::default();
    let mut position = 0usize;
    let mut index = 0usize;

    while index < tokens.len() {
        let token = tokens[index].as_ref();

        let Some(key) = option_key(token) else {
            match schema.positional(position) {
                Some(entry) => {
                    trace!(index, position, field = %entry.key, "positional token");
                    parsed.positionals.insert(position, token.to_string());
                }
                None => {
                    trace!(index, position, token, "unknown positional token");
                    parsed.unknown_positionals.push(token.to_string());
                }
            }
            position += 1;
            index += 1;
            continue;
        };

        let next = tokens.get(index + 1).map(|t| t.as_ref().to_string());

        match schema.lookup(key) {
            Some(entry) if entry.field.kind.is_flag() => {
                trace!(index, key, field = %entry.key, "flag option");
                record(&mut parsed.named, &entry.key, OptionValue::Flag(true));
                index += 1;
            }
            Some(entry) => {
                trace!(index, key, field = %entry.key, value = ?next, "value option");
                let value = OptionValue::Str(next.unwrap_or_default());
                record(&mut parsed.named, &entry.key, value);
                index += 2;
            }
            None => {
                trace!(index, key, value = ?next, "unknown option");
                let value = next.map_or(OptionValue::Flag(true), OptionValue::Str);
                record(&mut parsed.unknown_options, key, value);
                index += 2;
            }
        }
    }

    parsed
}

/// Splits `--key=value` tokens into `--key`, `value`.
///
/// Only prefixed tokens are split, at the first separator; bare tokens and
/// prefixed tokens without a separator pass through unchanged.
///
/// # Examples
///
/// ```
/// use command_tree_core::split_key_values;
///
/// let tokens = split_key_values(["run", "--mode=a=b", "-x", "k=v"]);
/// assert_eq!(tokens, vec!["run", "--mode", "a=b", "-x", "k=v"]);
/// ```
pub fn split_key_values<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = Vec::new();
    for token in tokens {
        let token: String = token.into();
        match option_key(&token).and_then(|key| key.split_once(KEY_VALUE_SEPARATOR)) {
            Some((key, value)) if !key.is_empty() => {
                let prefix_len = token.len() - token.trim_start_matches(OPTION_PREFIX).len();
                out.push(format!("{}{key}", &token[..prefix_len]));
                out.push(value.to_string());
            }
            _ => out.push(token),
        }
    }
    out
}

/// Returns the bare key of a prefixed token, or `None` for a positional
/// token. A token made only of prefix characters has no key and counts as
/// positional.
fn option_key(token: &str) -> Option<&str> {
    if !token.starts_with(OPTION_PREFIX) {
        return None;
    }
    let key = token.trim_start_matches(OPTION_PREFIX);
    (!key.is_empty()).then_some(key)
}

fn record(map: &mut OptionMap, key: &str, value: OptionValue) {
    match map.get_mut(key) {
        Some(existing) => existing.push(value),
        None => {
            map.insert(key.to_string(), value);
        }
    }
}
