//! Command resolution over the command tree.
//!
//! [`resolve`] scans the raw tokens once. Until a root command matches,
//! every token is tried against the root commands; once one matches, each
//! following token must name a child of the current command. The first
//! token that does not commits the resolution to the deepest command
//! reached, and no later token is treated as a command name.

use tracing::{debug, trace};

use crate::command::lookup;
use crate::error::ResolveError;
use crate::CommandNode;

/// Outcome of a successful resolution.
#[derive(Debug)]
pub struct Resolution<'a> {
    /// The resolved (deepest) command.
    pub command: &'a CommandNode,
    /// Child indexes from the root list down to `command`.
    pub path: Vec<usize>,
    /// Tokens that named commands, in input order.
    pub chain: Vec<String>,
    /// Every other token, in input order.
    pub remaining: Vec<String>,
}

/// Resolves the command a token sequence selects.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] when no token names a root command.
///
/// # Examples
///
/// ```
/// use command_tree::{Command, CommandNode, Invocation, resolve};
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
/// let mut init = CommandNode::new("init", Noop).unwrap();
/// init.add("sub", Noop).unwrap();
/// let commands = vec![init];
///
/// let tokens: Vec<String> = ["init", "x", "sub"].map(String::from).to_vec();
/// let resolution = resolve(&commands, &tokens).unwrap();
/// assert_eq!(resolution.command.name(), "init");
/// assert_eq!(resolution.chain, vec!["init"]);
/// assert_eq!(resolution.remaining, vec!["x", "sub"]);
/// ```
pub fn resolve<'a>(
    commands: &'a [CommandNode],
    tokens: &[String],
) -> Result<Resolution<'a>, ResolveError> {
    let mut current: Option<&'a CommandNode> = None;
    let mut path = Vec::new();
    let mut chain_indexes = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        let siblings = match current {
            Some(command) => command.children(),
            None => commands,
        };

        match position(siblings, token) {
            Some(child) => {
                trace!(index, token = %token, "command token");
                current = Some(&siblings[child]);
                path.push(child);
                chain_indexes.push(index);
            }
            // the chain broke: the deepest command reached is final
            None if current.is_some() => break,
            None => {}
        }
    }

    let command = current.ok_or(ResolveError::NotFound)?;

    let mut chain = Vec::with_capacity(chain_indexes.len());
    let mut remaining = Vec::with_capacity(tokens.len() - chain_indexes.len());
    for (index, token) in tokens.iter().enumerate() {
        if chain_indexes.contains(&index) {
            chain.push(token.clone());
        } else {
            remaining.push(token.clone());
        }
    }

    debug!(chain = ?chain, remaining = remaining.len(), "resolved command");

    Ok(Resolution {
        command,
        path,
        chain,
        remaining,
    })
}

/// Walks an already known name chain from the root commands.
///
/// Returns `None` for an empty chain or when any name is missing.
pub fn find_by_chain<'a, S: AsRef<str>>(
    commands: &'a [CommandNode],
    chain: &[S],
) -> Option<&'a CommandNode> {
    let (first, rest) = chain.split_first()?;
    let mut command = lookup(commands, first.as_ref())?;
    for name in rest {
        command = command.lookup_child(name.as_ref())?;
    }
    Some(command)
}

/// Follows a child-index path, mutably.
pub(crate) fn node_at_mut<'a>(
    commands: &'a mut [CommandNode],
    path: &[usize],
) -> Option<&'a mut CommandNode> {
    let (first, rest) = path.split_first()?;
    let mut command = commands.get_mut(*first)?;
    for index in rest {
        command = command.children_mut().get_mut(*index)?;
    }
    Some(command)
}

/// Follows a child-index path.
pub(crate) fn node_at<'a>(commands: &'a [CommandNode], path: &[usize]) -> Option<&'a CommandNode> {
    let (first, rest) = path.split_first()?;
    let mut command = commands.get(*first)?;
    for index in rest {
        command = command.children().get(*index)?;
    }
    Some(command)
}

fn position(siblings: &[CommandNode], name: &str) -> Option<usize> {
    siblings.iter().position(|c| c.name() == name)
}
