//! The dispatcher.
//!
//! [`App::run`] drives one parse-and-dispatch cycle:
//!
//! 1. fail fast when no command is registered;
//! 2. on an empty invocation, run the default command (environment only) or
//!    return help;
//! 3. bind [`GlobalOptions`] from the full token sequence;
//! 4. resolve the command from the full token sequence; a miss is
//!    [`RunError::CommandNotFound`] unless only global options were given
//!    and help was requested;
//! 5. return help when the help flag is set;
//! 6. tokenize the remaining tokens against the command's schema, merge the
//!    environment, validate, and bind the command's options;
//! 7. invoke the handler with the bound globals and the [`Unknowns`]; a
//!    handler returning [`DisplaySubcommands`] yields help for its chain.

use command_tree_core::{
    OptionMap, bind, build_option_map, check_rules, extract_schema, split_key_values,
    tokenize,
};
use tracing::{debug, info, warn};

use crate::command::attach;
use crate::error::{DisplaySubcommands, RegistrationError, Result, RunError};
use crate::resolver::{node_at, node_at_mut, resolve};
use crate::{
    Command, CommandNode, GlobalOptions, HelpRenderer, Invocation, PlainHelp, Settings, Unknowns,
};

/// Name under which the default command is stored.
pub const DEFAULT_COMMAND_NAME: &str = "default";

/// Successful terminal outcomes of [`App::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A command ran to completion.
    Completed,
    /// Help was requested (or nothing was invoked); the caller should show
    /// the text.
    Help(String),
}

/// A command tree plus the global options it is dispatched with.
///
/// # Examples
///
/// ```
/// use command_tree::{App, Command, GlobalOptions, Invocation, Outcome, Settings};
///
/// struct Hello;
///
/// impl Command for Hello {
///     type Options = ();
///
///     fn help(&self) -> &str {
///         "Say hello"
///     }
///
///     fn run(&self, _: &(), invocation: &Invocation<'_>) -> anyhow::Result<()> {
///         assert_eq!(invocation.unknowns.args, vec!["world"]);
///         Ok(())
///     }
/// }
///
/// let mut app = App::new(Settings::new("greeter"), GlobalOptions::new("/"));
/// app.add("hello", Hello).unwrap();
///
/// let outcome = app.run_with_env(["hello", "world", "-v", "1"], Vec::new()).unwrap();
/// assert_eq!(outcome, Outcome::Completed);
/// assert_eq!(app.global_options().verbosity, 1);
///
/// let outcome = app.run_with_env(["hello", "--help"], Vec::new()).unwrap();
/// assert!(matches!(outcome, Outcome::Help(text) if text.contains("$ hello")));
/// ```
pub struct App {
    settings: Settings,
    initial_globals: GlobalOptions,
    globals: GlobalOptions,
    commands: Vec<CommandNode>,
    default_command: Option<CommandNode>,
    help: Box<dyn HelpRenderer>,
}

impl App {
    /// Creates an application with no commands.
    pub fn new(settings: Settings, globals: GlobalOptions) -> Self {
        Self {
            settings,
            initial_globals: globals.clone(),
            globals,
            commands: Vec::new(),
            default_command: None,
            help: Box::new(PlainHelp),
        }
    }

    /// Replaces the help collaborator.
    pub fn with_help_renderer(mut self, renderer: impl HelpRenderer + 'static) -> Self {
        self.help = Box::new(renderer);
        self
    }

    /// Registers a root command and returns it for nesting subcommands.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] for invalid or already registered names.
    pub fn add<C: Command + 'static>(
        &mut self,
        name: &str,
        command: C,
    ) -> std::result::Result<&mut CommandNode, RegistrationError> {
        attach(&mut self.commands, CommandNode::new(name, command)?)
    }

    /// Sets the command run on an empty invocation.
    ///
    /// The default command is bound from the environment only.
    pub fn set_default<C: Command + 'static>(
        &mut self,
        command: C,
    ) -> std::result::Result<&mut CommandNode, RegistrationError> {
        Ok(self
            .default_command
            .insert(CommandNode::new(DEFAULT_COMMAND_NAME, command)?))
    }

    /// Root commands in registration order.
    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    /// Global options as bound by the last run.
    ///
    /// Each run starts again from the options passed to [`App::new`].
    pub fn global_options(&self) -> &GlobalOptions {
        &self.globals
    }

    /// Application settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Renders help for `chain` (all commands when empty).
    pub fn render_help(&self, chain: &[String]) -> String {
        self.help.render(&self.settings.name, &self.commands, chain)
    }

    /// Runs one invocation against the process environment.
    ///
    /// The environment is read once; when
    /// [`Settings::inherit_env`] is off, commands see none of it.
    ///
    /// # Errors
    ///
    /// See [`run_with_env`](App::run_with_env).
    pub fn run<I, S>(&mut self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let env = if self.settings.inherit_env {
            std::env::vars().collect()
        } else {
            Vec::new()
        };
        self.run_with_env(args, env)
    }

    /// Runs one invocation against an explicit environment table.
    ///
    /// # Errors
    ///
    /// - [`RunError::NoCommandsRegistered`] before anything else when the
    ///   tree is empty.
    /// - [`RunError::NoArguments`] on an empty invocation when
    ///   [`Settings::forbid_empty_invocation`] is set.
    /// - [`RunError::CommandNotFound`] (with help text) when no command
    ///   matches, help flag or not. Only an invocation made of global
    ///   options alone returns [`Outcome::Help`] for a bare `--help`.
    /// - [`RunError::Schema`], [`RunError::ValidationFailed`],
    ///   [`RunError::GlobalBindingFailed`], [`RunError::BindingFailed`] and
    ///   [`RunError::HandlerFailed`] from the binding and invocation stages.
    pub fn run_with_env<I, S>(&mut self, args: I, env: Vec<(String, String)>) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.commands.is_empty() {
            return Err(RunError::NoCommandsRegistered);
        }
        self.globals = self.initial_globals.clone();

        let tokens: Vec<String> = if self.settings.split_key_value {
            split_key_values(args)
        } else {
            args.into_iter().map(Into::into).collect()
        };

        if tokens.is_empty() {
            return self.run_empty(&env);
        }

        let command_attempted = self.bind_globals(&tokens)?;

        let resolution = match resolve(&self.commands, &tokens) {
            Ok(resolution) => resolution,
            Err(err) => {
                let help = self.render_help(&[]);
                // `--help` alone names no command, so nothing was missed
                if self.globals.help && !command_attempted {
                    debug!("help requested without a command");
                    return Ok(Outcome::Help(help));
                }
                warn!(error = %err, tokens = ?tokens, "failed to match command by args");
                return Err(RunError::CommandNotFound { help });
            }
        };
        let path = resolution.path;
        let chain = resolution.chain;
        let remaining = resolution.remaining;
        let chain_name = chain.join(" ");

        if self.globals.help {
            debug!(command = %chain_name, "help requested");
            return Ok(Outcome::Help(self.render_help(&chain)));
        }

        let Some(node) = node_at_mut(&mut self.commands, &path) else {
            return Err(RunError::CommandNotFound {
                help: self.render_help(&[]),
            });
        };
        let unknowns = prepare(node, &remaining, &env, &chain_name)?;

        let Some(node) = node_at(&self.commands, &path) else {
            return Err(RunError::CommandNotFound {
                help: self.render_help(&[]),
            });
        };
        self.invoke(node, &chain, &chain_name, &unknowns)
    }

    fn run_empty(&mut self, env: &[(String, String)]) -> Result<Outcome> {
        if self.settings.forbid_empty_invocation {
            return Err(RunError::NoArguments);
        }

        let Some(mut node) = self.default_command.take() else {
            debug!("empty invocation without default command, showing help");
            return Ok(Outcome::Help(self.render_help(&[])));
        };

        info!("running default command");
        // no command-line tokens: the default command binds from the environment only
        let result = prepare(&mut node, &[], env, DEFAULT_COMMAND_NAME)
            .and_then(|unknowns| self.invoke(&node, &[], DEFAULT_COMMAND_NAME, &unknowns));
        self.default_command = Some(node);
        result
    }

    /// Binds the global options from the full token sequence.
    ///
    /// Unrecognized tokens are left for the command. Returns `true` when a
    /// bare token remains that could have named a command.
    fn bind_globals(&mut self, tokens: &[String]) -> Result<bool> {
        let schema = extract_schema(&self.globals).map_err(|source| RunError::Schema {
            chain: String::new(),
            source,
        })?;
        let parsed = tokenize(tokens, &schema);
        let map = build_option_map(&parsed, &schema, &[]);
        bind(&mut self.globals, &schema, &map).map_err(RunError::GlobalBindingFailed)?;
        debug!(globals = ?self.globals, "bound global options");
        Ok(!parsed.unknown_positionals.is_empty())
    }

    fn invoke(
        &self,
        node: &CommandNode,
        chain: &[String],
        chain_name: &str,
        unknowns: &Unknowns,
    ) -> Result<Outcome> {
        let invocation = Invocation {
            globals: &self.globals,
            unknowns,
            chain,
            commands: &self.commands,
            app_name: &self.settings.name,
            help: self.help.as_ref(),
        };

        info!(command = %chain_name, "running command");
        match node.run(&invocation) {
            Ok(()) => Ok(Outcome::Completed),
            Err(source) if source.is::<DisplaySubcommands>() => {
                debug!(command = %chain_name, "handler asked for its subcommands");
                Ok(Outcome::Help(self.render_help(chain)))
            }
            Err(source) => Err(RunError::HandlerFailed {
                chain: chain_name.to_string(),
                source,
            }),
        }
    }
}

/// Tokenizes `tokens` against the command's schema, validates and binds its
/// options with the environment merged in, and returns the leftovers for the
/// handler.
fn prepare(
    node: &mut CommandNode,
    tokens: &[String],
    env: &[(String, String)],
    chain: &str,
) -> Result<Unknowns> {
    let schema = node.schema().map_err(|source| RunError::Schema {
        chain: chain.to_string(),
        source,
    })?;
    let parsed = tokenize(tokens, &schema);
    let map: OptionMap = build_option_map(&parsed, &schema, env);

    let mut violations = check_rules(&schema, &map).err().unwrap_or_default();
    if let Err(more) = node.validate(&map) {
        violations.extend(more);
    }
    if !violations.is_empty() {
        return Err(RunError::ValidationFailed {
            chain: chain.to_string(),
            violations,
        });
    }

    node.bind(&schema, &map)
        .map_err(|source| RunError::BindingFailed {
            chain: chain.to_string(),
            source,
        })?;

    Ok(Unknowns {
        args: parsed.unknown_positionals,
        options: parsed.unknown_options,
    })
}
