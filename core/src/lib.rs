//! Option schemas, argument tokenization and typed option binding.
//!
//! This crate holds the algorithmic core of a command tree front-end:
//!
//! - [`OptionField`] / [`Options`]: declarative description of an options
//!   object's bindable fields (long name, short alias, positional slot,
//!   kind, help, env binding, default, rules), nested groups included.
//! - [`extract_schema`]: validates a declaration and flattens it into a
//!   [`Schema`]; malformed declarations yield a [`SchemaError`].
//! - [`tokenize`]: classifies a token sequence into recognized options,
//!   recognized positionals and unknown leftovers ([`ParsedArgs`]).
//! - [`build_option_map`], [`check_rules`], [`bind`]: merge command line,
//!   environment and defaults, enforce field rules, and coerce tagged
//!   [`OptionValue`]s into the typed options object.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//!
//! #[derive(Default)]
//! struct Init {
//!     name: String,
//!     force: bool,
//! }
//!
//! impl Options for Init {
//!     fn fields(&self) -> Vec<OptionField> {
//!         vec![
//!             OptionField::positional(0, "name", ValueKind::String).required(),
//!             OptionField::flag("force").with_short("f"),
//!         ]
//!     }
//!
//!     fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
//!         match key {
//!             "name" => self.name = value.coerce(key)?,
//!             "force" => self.force = value.coerce(key)?,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut init = Init::default();
//! let schema = extract_schema(&init).unwrap();
//! let parsed = tokenize(&["demo", "-f", "--color", "never"], &schema);
//! let map = build_option_map(&parsed, &schema, &[]);
//!
//! assert!(check_rules(&schema, &map).is_ok());
//! bind(&mut init, &schema, &map).unwrap();
//!
//! assert_eq!(init.name, "demo");
//! assert!(init.force);
//! assert_eq!(parsed.unknown_options["color"], OptionValue::from("never"));
//! ```

mod binder;
mod schema;
mod tokenizer;
mod validate;
mod value;

pub use binder::{BindError, FieldViolation, bind, build_option_map, check_rules};
pub use schema::{
    GROUP_SEPARATOR, OptionField, Options, Schema, SchemaEntry, ValueKind, extract_schema,
    extract_schema_from_fields, group_key,
};
pub use tokenizer::{KEY_VALUE_SEPARATOR, OPTION_PREFIX, ParsedArgs, split_key_values, tokenize};
pub use validate::{SchemaError, validate_fields};
pub use value::{FromOptionValue, OptionMap, OptionValue, parse_bool};
