//! Tagged option values carried between tokenization and binding.
//!
//! Raw tokens never reach an options object directly. The tokenizer records
//! them as [`OptionValue`]s and the binder coerces each value into the
//! declared field type through [`FromOptionValue`], reporting a
//! [`BindError`] when the raw text does not fit.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::BindError;

/// Ordered map of option key to raw value.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// A not-yet-coerced option value.
///
/// # Examples
///
/// ```
/// use command_tree_core::OptionValue;
///
/// let mut value = OptionValue::from("a");
/// value.push(OptionValue::from("b"));
/// value.push(OptionValue::from("c"));
/// assert_eq!(value, OptionValue::List(vec!["a".into(), "b".into(), "c".into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Bare flag with no value token.
    Flag(bool),
    /// Single value token.
    Str(String),
    /// Values of a key that was given more than once, in input order.
    List(Vec<String>),
}

impl OptionValue {
    /// Folds a repeated occurrence of the same key into this value.
    ///
    /// A single string becomes a two-element list, lists grow by one. A
    /// flag folded with a string takes part as the literal `"true"` so no
    /// occurrence is lost; two flags stay a flag.
    pub fn push(&mut self, next: OptionValue) {
        let merged = match (std::mem::replace(self, OptionValue::Flag(true)), next) {
            (OptionValue::Flag(a), OptionValue::Flag(b)) => OptionValue::Flag(a || b),
            (OptionValue::List(mut items), next) => {
                items.extend(next.into_strings());
                OptionValue::List(items)
            }
            (current, next) => {
                let mut items = current.into_strings();
                items.extend(next.into_strings());
                OptionValue::List(items)
            }
        };
        *self = merged;
    }

    /// Returns the value as a single string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the last string this value carries, rendering flags as
    /// `"true"`/`"false"`.
    pub fn last_str(&self) -> String {
        match self {
            OptionValue::Flag(b) => b.to_string(),
            OptionValue::Str(s) => s.clone(),
            OptionValue::List(items) => items.last().cloned().unwrap_or_default(),
        }
    }

    /// Flattens the value into its string occurrences.
    pub fn into_strings(self) -> Vec<String> {
        match self {
            OptionValue::Flag(b) => vec![b.to_string()],
            OptionValue::Str(s) => vec![s],
            OptionValue::List(items) => items,
        }
    }

    /// Coerces the value into `T`, naming `field` in the error.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::InvalidValue`] when the raw text cannot be
    /// converted.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_tree_core::OptionValue;
    ///
    /// let level: u8 = OptionValue::from("2").coerce("verbosity").unwrap();
    /// assert_eq!(level, 2);
    /// assert!(OptionValue::from("two").coerce::<u8>("verbosity").is_err());
    /// ```
    pub fn coerce<T: FromOptionValue>(&self, field: &str) -> Result<T, BindError> {
        T::from_option_value(self).map_err(|expected| BindError::InvalidValue {
            field: field.to_string(),
            value: self.to_string(),
            expected,
        })
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Flag(b) => write!(f, "{b}"),
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<&OptionValue> for serde_json::Value {
    fn from(value: &OptionValue) -> Self {
        match value {
            OptionValue::Flag(b) => serde_json::Value::Bool(*b),
            OptionValue::Str(s) => serde_json::Value::String(s.clone()),
            OptionValue::List(items) => serde_json::Value::Array(
                items.iter().cloned().map(serde_json::Value::String).collect(),
            ),
        }
    }
}

/// Conversion from a raw [`OptionValue`] into a typed field.
///
/// The error is a short description of the expected type, used to build
/// [`BindError::InvalidValue`].
pub trait FromOptionValue: Sized {
    fn from_option_value(value: &OptionValue) -> Result<Self, &'static str>;
}

/// Parses the usual spellings of a boolean.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl FromOptionValue for bool {
    fn from_option_value(value: &OptionValue) -> Result<Self, &'static str> {
        match value {
            OptionValue::Flag(b) => Ok(*b),
            // an empty value after a boolean key still means "set"
            OptionValue::Str(s) if s.is_empty() => Ok(true),
            other => parse_bool(&other.last_str()).ok_or("boolean"),
        }
    }
}

impl FromOptionValue for String {
    fn from_option_value(value: &OptionValue) -> Result<Self, &'static str> {
        match value {
            OptionValue::Flag(_) => Err("string"),
            other => Ok(other.last_str()),
        }
    }
}

impl FromOptionValue for PathBuf {
    fn from_option_value(value: &OptionValue) -> Result<Self, &'static str> {
        String::from_option_value(value)
            .map(PathBuf::from)
            .map_err(|_| "path")
    }
}

impl FromOptionValue for Vec<String> {
    fn from_option_value(value: &OptionValue) -> Result<Self, &'static str> {
        match value {
            OptionValue::Flag(_) => Err("list of strings"),
            other => Ok(other.clone().into_strings()),
        }
    }
}

impl<T: FromOptionValue> FromOptionValue for Option<T> {
    fn from_option_value(value: &OptionValue) -> Result<Self, &'static str> {
        T::from_option_value(value).map(Some)
    }
}

macro_rules! number_from_option_value {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl FromOptionValue for $ty {
                fn from_option_value(value: &OptionValue) -> Result<Self, &'static str> {
                    match value {
                        OptionValue::Flag(_) => Err($expected),
                        other => other.last_str().trim().parse().map_err(|_| $expected),
                    }
                }
            }
        )*
    };
}

number_from_option_value! {
    i8 => "integer", i16 => "integer", i32 => "integer", i64 => "integer", isize => "integer",
    u8 => "unsigned integer", u16 => "unsigned integer", u32 => "unsigned integer",
    u64 => "unsigned integer", usize => "unsigned integer",
    f32 => "number", f64 => "number",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_builds_ordered_list() {
        let mut value = OptionValue::from("first");
        value.push(OptionValue::from("second"));
        assert_eq!(
            value,
            OptionValue::List(vec!["first".into(), "second".into()])
        );
        value.push(OptionValue::from("third"));
        assert_eq!(
            value,
            OptionValue::List(vec!["first".into(), "second".into(), "third".into()])
        );
    }

    #[test]
    fn test_push_flags_stay_flag() {
        let mut value = OptionValue::Flag(true);
        value.push(OptionValue::Flag(true));
        assert_eq!(value, OptionValue::Flag(true));
    }

    #[test]
    fn test_push_flag_and_string_keeps_both() {
        let mut value = OptionValue::from("a");
        value.push(OptionValue::Flag(true));
        assert_eq!(value, OptionValue::List(vec!["a".into(), "true".into()]));
    }

    #[test]
    fn test_coerce_bool_spellings() {
        for raw in ["yes", "TRUE", "on", "1"] {
            assert!(OptionValue::from(raw).coerce::<bool>("b").unwrap());
        }
        for raw in ["no", "false", "Off", "0"] {
            assert!(!OptionValue::from(raw).coerce::<bool>("b").unwrap());
        }
        assert!(OptionValue::Flag(true).coerce::<bool>("b").unwrap());
    }

    #[test]
    fn test_coerce_reports_field_and_value() {
        let err = OptionValue::from("abc").coerce::<u8>("verbosity").unwrap_err();
        assert_eq!(
            err,
            BindError::InvalidValue {
                field: "verbosity".into(),
                value: "abc".into(),
                expected: "unsigned integer",
            }
        );
    }

    #[test]
    fn test_coerce_list_takes_last_for_scalars() {
        let value = OptionValue::List(vec!["1".into(), "5".into()]);
        assert_eq!(value.coerce::<i32>("n").unwrap(), 5);
        assert_eq!(
            value.coerce::<Vec<String>>("n").unwrap(),
            vec!["1".to_string(), "5".to_string()]
        );
    }

    #[test]
    fn test_json_conversion() {
        let value = OptionValue::List(vec!["a".into()]);
        assert_eq!(serde_json::Value::from(&value), serde_json::json!(["a"]));
        assert_eq!(
            serde_json::Value::from(&OptionValue::Flag(true)),
            serde_json::json!(true)
        );
    }
}
