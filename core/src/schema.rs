//! Option schema declarations and extraction.
//!
//! An options type describes its bindable fields once, through the
//! [`Options`] trait, as a list of [`OptionField`]s. [`extract_schema`]
//! validates that declaration and flattens nested groups into a [`Schema`]
//! that the tokenizer, the binder and help rendering all consume.

use serde::{Deserialize, Serialize};

use crate::validate::validate_fields;
use crate::{BindError, OptionValue, SchemaError};

/// Separator between a group key and its nested field key.
pub const GROUP_SEPARATOR: char = '.';

/// Primitive kind of a field.
///
/// `Bool` fields never consume a value token; every other bindable kind
/// takes the token that follows its key.
///
/// # Examples
///
/// ```
/// use command_tree_core::ValueKind;
///
/// assert!(ValueKind::Bool.is_flag());
/// assert!(!ValueKind::Number.is_flag());
/// assert_eq!(ValueKind::default(), ValueKind::String);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValueKind {
    /// Boolean flag.
    Bool,
    /// Free-form text (the default).
    #[default]
    String,
    /// Integer or floating point number.
    Number,
    /// Repeatable text value collected into a list.
    List,
    /// Nested group of fields.
    Group,
}

impl ValueKind {
    /// Returns `true` for the boolean kind.
    pub fn is_flag(self) -> bool {
        self == ValueKind::Bool
    }
}

/// Descriptor for one bindable field.
///
/// Build fields with [`flag`](OptionField::flag),
/// [`value`](OptionField::value), [`positional`](OptionField::positional) or
/// [`group`](OptionField::group), then chain modifiers.
///
/// # Examples
///
/// ```
/// use command_tree_core::{OptionField, ValueKind};
///
/// let cwd = OptionField::value("cwd", ValueKind::String)
///     .with_short("c")
///     .with_help("Current working directory");
/// assert!(cwd.matches("cwd"));
/// assert!(cwd.matches("c"));
/// assert!(!cwd.matches("cd"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionField {
    /// Long name, used as the binding key.
    pub long: String,
    /// Short alias.
    pub short: Option<String>,
    /// Index among positional tokens.
    pub position: Option<usize>,
    /// Primitive kind.
    pub kind: ValueKind,
    /// Help text.
    pub help: Option<String>,
    /// Environment variable that feeds this field.
    pub env: Option<String>,
    /// Raw default applied when neither the command line nor the
    /// environment provides a value.
    pub default: Option<String>,
    /// Must be present after defaults and environment are applied.
    pub required: bool,
    /// Regex the raw value must match.
    pub pattern: Option<String>,
    /// Allowed raw values.
    pub choices: Vec<String>,
    /// Nested fields of a group.
    pub fields: Vec<OptionField>,
}

impl OptionField {
    fn new(long: &str, kind: ValueKind) -> Self {
        Self {
            long: long.to_string(),
            short: None,
            position: None,
            kind,
            help: None,
            env: None,
            default: None,
            required: false,
            pattern: None,
            choices: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Creates a boolean field.
    pub fn flag(long: &str) -> Self {
        Self::new(long, ValueKind::Bool)
    }

    /// Creates a named field taking a value.
    pub fn value(long: &str, kind: ValueKind) -> Self {
        Self::new(long, kind)
    }

    /// Creates a field bound from the positional token at `index`.
    ///
    /// `name` is the binding key; positional fields are never matched by a
    /// prefixed key.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_tree_core::{OptionField, ValueKind};
    ///
    /// let target = OptionField::positional(0, "target", ValueKind::String);
    /// assert_eq!(target.position, Some(0));
    /// assert!(!target.matches("target"));
    /// ```
    pub fn positional(index: usize, name: &str, kind: ValueKind) -> Self {
        Self {
            position: Some(index),
            ..Self::new(name, kind)
        }
    }

    /// Creates a group of nested fields.
    pub fn group(long: &str, fields: Vec<OptionField>) -> Self {
        Self {
            fields,
            ..Self::new(long, ValueKind::Group)
        }
    }

    /// Sets the short alias.
    pub fn with_short(mut self, short: &str) -> Self {
        self.short = Some(short.to_string());
        self
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Binds the field from an environment variable.
    pub fn with_env(mut self, name: &str) -> Self {
        self.env = Some(name.to_string());
        self
    }

    /// Sets the raw default value.
    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts raw values to those matching `pattern`.
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    /// Restricts raw values to `choices`.
    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Checks whether a bare key names this field by long name or alias.
    pub fn matches(&self, key: &str) -> bool {
        if self.position.is_some() {
            return false;
        }
        self.long == key || self.short.as_deref() == Some(key)
    }
}

/// An options object with a declared shape.
///
/// `fields` declares the schema; `set` receives one coerced-on-demand value
/// per bound key. Nested groups receive dotted keys
/// (`features.billing`); [`group_key`] strips the group prefix.
///
/// # Examples
///
/// ```
/// use command_tree_core::{BindError, OptionField, OptionValue, Options, ValueKind};
///
/// #[derive(Default)]
/// struct Serve {
///     port: u16,
///     verbose: bool,
/// }
///
/// impl Options for Serve {
///     fn fields(&self) -> Vec<OptionField> {
///         vec![
///             OptionField::value("port", ValueKind::Number).with_short("p"),
///             OptionField::flag("verbose"),
///         ]
///     }
///
///     fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
///         match key {
///             "port" => self.port = value.coerce(key)?,
///             "verbose" => self.verbose = value.coerce(key)?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
///
/// let mut serve = Serve::default();
/// serve.set("port", &OptionValue::from("8080")).unwrap();
/// assert_eq!(serve.port, 8080);
/// ```
pub trait Options {
    /// Declares the bindable fields, in order.
    fn fields(&self) -> Vec<OptionField>;

    /// Stores the value for `key`. Unknown keys are ignored.
    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError>;
}

impl Options for () {
    fn fields(&self) -> Vec<OptionField> {
        Vec::new()
    }

    fn set(&mut self, _key: &str, _value: &OptionValue) -> Result<(), BindError> {
        Ok(())
    }
}

/// Strips the `group.` prefix from a dotted key.
///
/// # Examples
///
/// ```
/// use command_tree_core::group_key;
///
/// assert_eq!(group_key("features.billing", "features"), Some("billing"));
/// assert_eq!(group_key("featuresx.billing", "features"), None);
/// assert_eq!(group_key("billing", "features"), None);
/// ```
pub fn group_key<'k>(key: &'k str, group: &str) -> Option<&'k str> {
    key.strip_prefix(group)?.strip_prefix(GROUP_SEPARATOR)
}

/// One bindable field with its fully qualified key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Dotted long key (e.g. `features.billing`).
    pub key: String,
    /// Every other spelling that selects this field (short forms, mixed
    /// dotted forms such as `f.b`).
    pub aliases: Vec<String>,
    /// The declaring field; nested fields are not repeated here.
    pub field: OptionField,
}

impl SchemaEntry {
    /// Checks whether `key` selects this entry through its canonical key or
    /// an alias. Positional entries never match a named key.
    pub fn matches(&self, key: &str) -> bool {
        self.field.position.is_none() && (self.key == key || self.aliases.iter().any(|a| a == key))
    }
}

/// Validated, flattened schema of an options object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<OptionField>,
    entries: Vec<SchemaEntry>,
}

impl Schema {
    /// Declared top-level fields, groups unflattened.
    pub fn fields(&self) -> &[OptionField] {
        &self.fields
    }

    /// Bindable entries in declaration order, groups flattened.
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Returns `true` when the schema declares nothing bindable.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry a bare (prefix-stripped) key names.
    ///
    /// Canonical keys win over aliases so a long name is never shadowed by
    /// another field's short alias.
    pub fn lookup(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .find(|e| e.field.position.is_none() && e.key == key)
            .or_else(|| self.entries.iter().find(|e| e.matches(key)))
    }

    /// Finds the field declared for positional `index`.
    pub fn positional(&self, index: usize) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .find(|e| e.field.position == Some(index))
    }

    /// Finds the entry fed by environment variable `name`, either through an
    /// explicit env binding or an identical canonical key.
    pub fn by_env(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .find(|e| e.field.env.as_deref() == Some(name))
            .or_else(|| self.entries.iter().find(|e| e.key == name))
    }

    /// Finds an entry by canonical key.
    pub fn entry(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Extracts and validates the schema of an options object.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found in the declaration (duplicate
/// names, malformed names, invalid patterns, misplaced positionals).
///
/// # Examples
///
/// ```
/// use command_tree_core::{OptionField, ValueKind, extract_schema_from_fields};
///
/// let schema = extract_schema_from_fields(vec![
///     OptionField::group("features", vec![
///         OptionField::flag("billing").with_short("b"),
///     ]).with_short("f"),
/// ]).unwrap();
///
/// assert_eq!(schema.lookup("f.b").unwrap().key, "features.billing");
/// assert_eq!(schema.lookup("features.billing").unwrap().key, "features.billing");
/// ```
pub fn extract_schema(options: &dyn Options) -> Result<Schema, SchemaError> {
    extract_schema_from_fields(options.fields())
}

/// Validates and flattens an explicit field list.
///
/// # Errors
///
/// See [`extract_schema`].
pub fn extract_schema_from_fields(fields: Vec<OptionField>) -> Result<Schema, SchemaError> {
    if let Some(error) = validate_fields(&fields).into_iter().next() {
        return Err(error);
    }

    let mut entries = Vec::new();
    flatten(&fields, &[], &mut entries);

    Ok(Schema { fields, entries })
}

fn flatten(fields: &[OptionField], prefixes: &[(String, Vec<String>)], out: &mut Vec<SchemaEntry>) {
    for field in fields {
        let mut spellings = vec![field.long.clone()];
        if let Some(short) = field.short.as_ref().filter(|s| !s.is_empty()) {
            spellings.push(short.clone());
        }

        let (key, forms) = qualify(prefixes, &field.long, &spellings);

        if field.kind == ValueKind::Group {
            let mut nested = prefixes.to_vec();
            nested.push((field.long.clone(), spellings));
            flatten(&field.fields, &nested, out);
            continue;
        }

        let mut group_stripped = field.clone();
        group_stripped.fields.clear();
        out.push(SchemaEntry {
            aliases: forms.into_iter().filter(|f| *f != key).collect(),
            key,
            field: group_stripped,
        });
    }
}

/// Returns the canonical dotted key and every dotted spelling.
fn qualify(
    prefixes: &[(String, Vec<String>)],
    long: &str,
    spellings: &[String],
) -> (String, Vec<String>) {
    let separator = GROUP_SEPARATOR.to_string();
    let sep = separator.as_str();
    let key = prefixes
        .iter()
        .map(|(long, _)| long.as_str())
        .chain(std::iter::once(long))
        .collect::<Vec<_>>()
        .join(sep);

    let mut forms: Vec<String> = vec![String::new()];
    for (_, group_spellings) in prefixes {
        forms = forms
            .iter()
            .flat_map(|head| group_spellings.iter().map(move |s| join(head, s, sep)))
            .collect();
    }
    let forms = forms
        .iter()
        .flat_map(|head| spellings.iter().map(move |s| join(head, s, sep)))
        .collect();

    (key, forms)
}

fn join(head: &str, tail: &str, sep: &str) -> String {
    if head.is_empty() {
        tail.to_string()
    } else {
        format!("{head}{sep}{tail}")
    }
}
