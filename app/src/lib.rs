//! Nested command registration, resolution and dispatch.
//!
//! This crate turns a raw argument vector into one handler invocation:
//!
//! - [`Command`]: a handler with a typed options object (see
//!   [`command_tree_core::Options`]).
//! - [`CommandNode`] / [`App::add`]: an ordered command tree of arbitrary
//!   depth; names are fixed at registration and unique among siblings.
//! - [`resolve`]: greedy, no-backtrack matching of the longest command
//!   chain, splitting the tokens into the chain and the remainder.
//! - [`App::run`]: binds [`GlobalOptions`], resolves, short-circuits on
//!   help, binds the command's options from its tokens and the environment,
//!   and invokes it with the [`Unknowns`].
//!
//! The dispatcher never prints. Help is returned as text, either as
//! [`Outcome::Help`] or inside [`RunError::CommandNotFound`], produced by a
//! [`HelpRenderer`] ([`PlainHelp`] by default).
//!
//! # Example
//!
//! ```
//! use command_tree::{App, Command, GlobalOptions, Invocation, Outcome, Settings};
//! use command_tree_core::{BindError, OptionField, OptionValue, Options, ValueKind};
//!
//! #[derive(Default)]
//! struct AddOptions {
//!     name: String,
//!     url: String,
//! }
//!
//! impl Options for AddOptions {
//!     fn fields(&self) -> Vec<OptionField> {
//!         vec![
//!             OptionField::positional(0, "name", ValueKind::String).required(),
//!             OptionField::positional(1, "url", ValueKind::String).required(),
//!         ]
//!     }
//!
//!     fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
//!         match key {
//!             "name" => self.name = value.coerce(key)?,
//!             "url" => self.url = value.coerce(key)?,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! struct Remote;
//!
//! impl Command for Remote {
//!     type Options = ();
//!
//!     fn run(&self, _: &(), _: &Invocation<'_>) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct RemoteAdd;
//!
//! impl Command for RemoteAdd {
//!     type Options = AddOptions;
//!
//!     fn run(&self, options: &AddOptions, _: &Invocation<'_>) -> anyhow::Result<()> {
//!         anyhow::ensure!(options.url.starts_with("https://"), "only https remotes");
//!         Ok(())
//!     }
//! }
//!
//! let mut app = App::new(Settings::new("git"), GlobalOptions::default());
//! app.add("remote", Remote).unwrap().add("add", RemoteAdd).unwrap();
//!
//! let outcome = app
//!     .run_with_env(["remote", "add", "origin", "https://example.com"], Vec::new())
//!     .unwrap();
//! assert_eq!(outcome, Outcome::Completed);
//!
//! let err = app
//!     .run_with_env(["remote", "add", "origin", "ssh://example.com"], Vec::new())
//!     .unwrap_err();
//! assert_eq!(err.chain(), Some("remote add"));
//! ```

mod app;
mod command;
mod error;
mod globals;
mod help;
mod resolver;
mod settings;

pub use app::{App, DEFAULT_COMMAND_NAME, Outcome};
pub use command::{Command, CommandNode, Invocation, ParentCommand, Unknowns};
pub use error::{DisplaySubcommands, RegistrationError, ResolveError, Result, RunError};
pub use globals::GlobalOptions;
pub use help::{HelpRenderer, PlainHelp};
pub use resolver::{Resolution, find_by_chain, resolve};
pub use settings::{DEFAULT_APP_NAME, Settings};
