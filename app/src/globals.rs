//! Options bound for every invocation, before command resolution.

use command_tree_core::{BindError, OptionField, OptionValue, Options, ValueKind};
use serde::{Deserialize, Serialize};

/// Options every command shares.
///
/// Bound once per [`App::run`](crate::App::run) from the full token
/// sequence, whether or not a command matches.
///
/// # Examples
///
/// ```
/// use command_tree::GlobalOptions;
/// use command_tree_core::{Options, OptionValue};
///
/// let mut globals = GlobalOptions::default();
/// globals.set("verbosity", &OptionValue::from("2")).unwrap();
/// assert_eq!(globals.verbosity, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalOptions {
    /// Current working directory.
    pub cwd: String,
    /// Show help instead of running a command.
    pub help: bool,
    /// Verbosity level (0 - quiet, 1 - normal, 2 - verbose).
    pub verbosity: u8,
}

impl GlobalOptions {
    /// Creates global options rooted at `cwd`.
    pub fn new(cwd: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Default::default()
        }
    }
}

impl Options for GlobalOptions {
    fn fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::value("cwd", ValueKind::String)
                .with_short("c")
                .with_help("Current working directory"),
            OptionField::flag("help")
                .with_short("h")
                .with_help("Show help"),
            OptionField::value("verbosity", ValueKind::Number)
                .with_short("v")
                .with_help("Verbosity level (0 - quiet, 1 - normal, 2 - verbose)"),
        ]
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
        match key {
            "cwd" => self.cwd = value.coerce(key)?,
            "help" => self.help = value.coerce(key)?,
            "verbosity" => self.verbosity = value.coerce(key)?,
            _ => {}
        }
        Ok(())
    }
}
