//! Command handlers and the command tree.
//!
//! A [`Command`] is a handler with a typed options object. Registering it
//! under a name produces a [`CommandNode`] that owns the handler, a fresh
//! options object and an ordered list of child nodes.

use command_tree_core::{
    BindError, FieldViolation, OptionField, OptionMap, Options, Schema, SchemaError, bind,
    extract_schema,
};
use serde::{Deserialize, Serialize};

use crate::error::{DisplaySubcommands, RegistrationError};
use crate::{GlobalOptions, HelpRenderer};

/// Tokens and options that matched no declared field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unknowns {
    /// Bare tokens with no positional slot, in input order.
    pub args: Vec<String>,
    /// Unrecognized keys and their values.
    pub options: OptionMap,
}

/// Everything a handler receives besides its own options.
pub struct Invocation<'a> {
    /// Bound global options.
    pub globals: &'a GlobalOptions,
    /// Leftover tokens for ad-hoc use.
    pub unknowns: &'a Unknowns,
    /// Names from the root command to this one.
    pub chain: &'a [String],
    /// Root commands of the application.
    pub commands: &'a [CommandNode],
    /// Application name.
    pub app_name: &'a str,
    /// Help collaborator of the application.
    pub help: &'a dyn HelpRenderer,
}

impl Invocation<'_> {
    /// Renders help for `chain` (all commands when empty).
    pub fn render_help(&self, chain: &[String]) -> String {
        self.help.render(self.app_name, self.commands, chain)
    }
}

/// A command handler.
///
/// # Examples
///
/// ```
/// use command_tree::{Command, Invocation};
///
/// struct Version;
///
/// impl Command for Version {
///     type Options = ();
///
///     fn help(&self) -> &str {
///         "Print the version"
///     }
///
///     fn run(&self, _options: &(), _invocation: &Invocation<'_>) -> anyhow::Result<()> {
///         println!("1.0.0");
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// Options object populated before [`run`](Command::run).
    type Options: Options + Default + 'static;

    /// One-line description for help output.
    fn help(&self) -> &str {
        ""
    }

    /// Inspects the raw option map before binding.
    ///
    /// The map holds command-line values, environment variables and
    /// defaults, keyed as described in
    /// [`build_option_map`](command_tree_core::build_option_map).
    fn validate(&self, _options: &OptionMap) -> Result<(), Vec<FieldViolation>> {
        Ok(())
    }

    /// Runs the command.
    fn run(&self, options: &Self::Options, invocation: &Invocation<'_>) -> anyhow::Result<()>;
}

/// A command with no logic of its own that groups subcommands.
///
/// Invoking it shows its subcommands.
///
/// # Examples
///
/// ```
/// use command_tree::{App, Command, GlobalOptions, Invocation, Outcome, ParentCommand, Settings};
///
/// struct Add;
///
/// impl Command for Add {
///     type Options = ();
///
///     fn help(&self) -> &str {
///         "Add a remote"
///     }
///
///     fn run(&self, _: &(), _: &Invocation<'_>) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let mut app = App::new(Settings::new("git"), GlobalOptions::default());
/// app.add("remote", ParentCommand::new("Manage remotes"))
///     .unwrap()
///     .add("add", Add)
///     .unwrap();
///
/// let outcome = app.run_with_env(["remote"], Vec::new()).unwrap();
/// assert!(matches!(outcome, Outcome::Help(text) if text.contains("add  Add a remote")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParentCommand {
    help: String,
}

impl ParentCommand {
    /// Creates a parent command with a one-line description.
    pub fn new(help: impl Into<String>) -> Self {
        Self { help: help.into() }
    }
}

impl Command for ParentCommand {
    type Options = ();

    fn help(&self) -> &str {
        &self.help
    }

    fn run(&self, _: &(), _: &Invocation<'_>) -> anyhow::Result<()> {
        Err(DisplaySubcommands.into())
    }
}

/// Object-safe view of a registered command and its options object.
trait Handler {
    fn help(&self) -> &str;
    fn fields(&self) -> Vec<OptionField>;
    fn schema(&self) -> Result<Schema, SchemaError>;
    fn validate(&self, options: &OptionMap) -> Result<(), Vec<FieldViolation>>;
    fn bind(&mut self, schema: &Schema, options: &OptionMap) -> Result<(), BindError>;
    fn run(&self, invocation: &Invocation<'_>) -> anyhow::Result<()>;
}

struct Slot<C: Command> {
    command: C,
    options: C::Options,
}

impl<C: Command> Handler for Slot<C> {
    fn help(&self) -> &str {
        self.command.help()
    }

    fn fields(&self) -> Vec<OptionField> {
        self.options.fields()
    }

    fn schema(&self) -> Result<Schema, SchemaError> {
        extract_schema(&self.options)
    }

    fn validate(&self, options: &OptionMap) -> Result<(), Vec<FieldViolation>> {
        self.command.validate(options)
    }

    fn bind(&mut self, schema: &Schema, options: &OptionMap) -> Result<(), BindError> {
        // every invocation starts from a pristine options object
        self.options = C::Options::default();
        bind(&mut self.options, schema, options)
    }

    fn run(&self, invocation: &Invocation<'_>) -> anyhow::Result<()> {
        self.command.run(&self.options, invocation)
    }
}

/// A named node of the command tree.
///
/// The name is fixed at construction. Children keep registration order.
pub struct CommandNode {
    name: String,
    handler: Box<dyn Handler>,
    children: Vec<CommandNode>,
}

impl std::fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl CommandNode {
    /// Creates a detached node.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidName`] for names no token could
    /// select.
    pub fn new<C: Command + 'static>(name: &str, command: C) -> Result<Self, RegistrationError> {
        if !is_valid_name(name) {
            return Err(RegistrationError::InvalidName(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            handler: Box::new(Slot {
                command,
                options: C::Options::default(),
            }),
            children: Vec::new(),
        })
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    pub fn help(&self) -> &str {
        self.handler.help()
    }

    /// Child commands in registration order.
    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    /// Declared option fields of this command.
    pub fn fields(&self) -> Vec<OptionField> {
        self.handler.fields()
    }

    /// Registers a subcommand and returns it for further nesting.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] for invalid names or when a sibling
    /// already uses `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_tree::{Command, CommandNode, Invocation, RegistrationError};
    ///
    /// struct Noop;
    ///
    /// impl Command for Noop {
    ///     type Options = ();
    ///
    ///     fn run(&self, _: &(), _: &Invocation<'_>) -> anyhow::Result<()> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let mut remote = CommandNode::new("remote", Noop).unwrap();
    /// remote.add("add", Noop).unwrap();
    /// assert_eq!(remote.lookup_child("add").unwrap().name(), "add");
    /// assert_eq!(
    ///     remote.add("add", Noop).unwrap_err(),
    ///     RegistrationError::DuplicateName("add".into()),
    /// );
    /// ```
    pub fn add<C: Command + 'static>(
        &mut self,
        name: &str,
        command: C,
    ) -> Result<&mut CommandNode, RegistrationError> {
        attach(&mut self.children, CommandNode::new(name, command)?)
    }

    /// Finds a direct child by exact name; the first match wins.
    pub fn lookup_child(&self, name: &str) -> Option<&CommandNode> {
        lookup(&self.children, name)
    }

    pub(crate) fn schema(&self) -> Result<Schema, SchemaError> {
        self.handler.schema()
    }

    pub(crate) fn validate(&self, options: &OptionMap) -> Result<(), Vec<FieldViolation>> {
        self.handler.validate(options)
    }

    pub(crate) fn bind(&mut self, schema: &Schema, options: &OptionMap) -> Result<(), BindError> {
        self.handler.bind(schema, options)
    }

    pub(crate) fn run(&self, invocation: &Invocation<'_>) -> anyhow::Result<()> {
        self.handler.run(invocation)
    }

    pub(crate) fn children_mut(&mut self) -> &mut [CommandNode] {
        &mut self.children
    }
}

/// Appends `node` to `siblings` unless its name is taken.
pub(crate) fn attach(
    siblings: &mut Vec<CommandNode>,
    node: CommandNode,
) -> Result<&mut CommandNode, RegistrationError> {
    if lookup(siblings, &node.name).is_some() {
        return Err(RegistrationError::DuplicateName(node.name));
    }
    siblings.push(node);
    let last = siblings.len() - 1;
    Ok(&mut siblings[last])
}

/// Linear scan in registration order.
pub(crate) fn lookup<'a>(commands: &'a [CommandNode], name: &str) -> Option<&'a CommandNode> {
    commands.iter().find(|c| c.name == name)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(command_tree_core::OPTION_PREFIX)
        && !name.chars().any(char::is_whitespace)
}
