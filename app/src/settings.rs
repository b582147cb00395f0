//! Application settings.
//!
//! [`Settings`] is serde-serializable so a host application can embed it in
//! its own configuration; every field has a default, so partial documents
//! deserialize.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "name": "mycli",
//!   "forbid_empty_invocation": false,
//!   "split_key_value": true,
//!   "inherit_env": true
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Name used in help output when none is configured.
pub const DEFAULT_APP_NAME: &str = "cli";

/// Dispatcher behavior switches.
///
/// # Examples
///
/// ```
/// use command_tree::Settings;
///
/// let settings = Settings::new("mycli").with_forbid_empty_invocation(true);
/// assert_eq!(settings.name, "mycli");
/// assert!(settings.forbid_empty_invocation);
/// assert!(settings.split_key_value);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application name shown in help output.
    pub name: String,
    /// Fail with [`RunError::NoArguments`](crate::RunError::NoArguments)
    /// instead of running the default command or showing help.
    pub forbid_empty_invocation: bool,
    /// Split `--key=value` tokens before tokenizing.
    pub split_key_value: bool,
    /// Feed the process environment into command options on
    /// [`App::run`](crate::App::run).
    pub inherit_env: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            forbid_empty_invocation: false,
            split_key_value: true,
            inherit_env: true,
        }
    }
}

impl Settings {
    /// Creates default settings with an application name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets [`forbid_empty_invocation`](Settings::forbid_empty_invocation).
    pub fn with_forbid_empty_invocation(mut self, forbid: bool) -> Self {
        self.forbid_empty_invocation = forbid;
        self
    }

    /// Sets [`split_key_value`](Settings::split_key_value).
    pub fn with_split_key_value(mut self, split: bool) -> Self {
        self.split_key_value = split;
        self
    }

    /// Sets [`inherit_env`](Settings::inherit_env).
    pub fn with_inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }
}
