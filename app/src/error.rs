//! Error types for registration, resolution and dispatch.
//!
//! [`RunError`] is the single failure type of [`App::run`](crate::App::run).
//! Its variants mirror the stage that failed, and every failure that happens
//! after command resolution carries the command chain (`"init sub"`) for
//! context.

use command_tree_core::{BindError, FieldViolation, SchemaError};
use thiserror::Error;

/// Command registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The name is empty, contains whitespace or starts with the option
    /// prefix, so no token could ever select it.
    #[error("invalid command name: {0:?}")]
    InvalidName(String),
    /// A sibling with the same name is already registered.
    #[error("duplicate command in scope: {0}")]
    DuplicateName(String),
}

/// Command resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No token names a root command.
    #[error("command not found")]
    NotFound,
}

/// Handler signal: show this command's subcommands instead of running.
///
/// A handler returns it through `anyhow` (`Err(DisplaySubcommands.into())`)
/// and the dispatcher answers with [`Outcome::Help`](crate::Outcome::Help)
/// for the command's chain. [`ParentCommand`](crate::ParentCommand) does
/// nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("display subcommands")]
pub struct DisplaySubcommands;

/// Failures of one [`App::run`](crate::App::run) invocation.
#[derive(Debug, Error)]
pub enum RunError {
    /// The application was wired without any command.
    #[error("no commands registered")]
    NoCommandsRegistered,

    /// Empty invocation while
    /// [`Settings::forbid_empty_invocation`](crate::Settings::forbid_empty_invocation)
    /// is set.
    #[error("no arguments provided")]
    NoArguments,

    /// No command matched; `help` holds the rendered guidance.
    #[error("command not found: showing help")]
    CommandNotFound { help: String },

    /// A command's options declaration is malformed.
    #[error("invalid options schema for {chain}: {source}")]
    Schema {
        chain: String,
        #[source]
        source: SchemaError,
    },

    /// The global options could not be bound.
    #[error("failed to bind global options: {0}")]
    GlobalBindingFailed(#[source] BindError),

    /// Field rules or the command's own validation rejected the raw options.
    #[error("validation failed for {chain}: {}", join_violations(.violations))]
    ValidationFailed {
        chain: String,
        violations: Vec<FieldViolation>,
    },

    /// A value could not be bound onto the command's options object.
    #[error("failed to bind options for {chain}: {source}")]
    BindingFailed {
        chain: String,
        #[source]
        source: BindError,
    },

    /// The command handler returned an error.
    #[error("failed to run command: {chain}: {source}")]
    HandlerFailed {
        chain: String,
        #[source]
        source: anyhow::Error,
    },
}

impl RunError {
    /// Returns `true` when help text was produced alongside the error, so
    /// callers can print it instead of a second error message.
    pub fn help_shown(&self) -> bool {
        matches!(self, RunError::CommandNotFound { .. })
    }

    /// Returns the help text produced alongside the error.
    pub fn help_text(&self) -> Option<&str> {
        match self {
            RunError::CommandNotFound { help } => Some(help),
            _ => None,
        }
    }

    /// Command chain the failure happened in, when one was resolved.
    pub fn chain(&self) -> Option<&str> {
        match self {
            RunError::Schema { chain, .. }
            | RunError::ValidationFailed { chain, .. }
            | RunError::BindingFailed { chain, .. }
            | RunError::HandlerFailed { chain, .. } => Some(chain),
            _ => None,
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`RunError`].
pub type Result<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = RunError::ValidationFailed {
            chain: "init".into(),
            violations: vec![
                FieldViolation::Missing { field: "name".into() },
                FieldViolation::Missing { field: "dir".into() },
            ],
        };
        assert_eq!(
            err.to_string(),
            "validation failed for init: name: value is required; dir: value is required"
        );
        assert_eq!(err.chain(), Some("init"));
        assert!(!err.help_shown());
    }

    #[test]
    fn test_not_found_carries_help() {
        let err = RunError::CommandNotFound {
            help: "Usage: cli".into(),
        };
        assert!(err.help_shown());
        assert_eq!(err.help_text(), Some("Usage: cli"));
        assert_eq!(err.chain(), None);
    }
}
