//! Help text rendering.
//!
//! The dispatcher never prints. When help is due it asks a
//! [`HelpRenderer`] for text and returns that text to the caller.
//! [`PlainHelp`] is the default renderer.

use command_tree_core::{OptionField, Options, ValueKind};

use crate::resolver::find_by_chain;
use crate::{CommandNode, GlobalOptions};

/// Produces human-readable help for a command list.
pub trait HelpRenderer {
    /// Renders help for `chain`, or for every command when `chain` is empty.
    fn render(&self, app_name: &str, commands: &[CommandNode], chain: &[String]) -> String;
}

/// Plain-text renderer: usage line, command list, option tables.
///
/// # Examples
///
/// ```
/// use command_tree::{Command, CommandNode, HelpRenderer, Invocation, PlainHelp};
///
/// struct Noop;
///
/// impl Command for Noop {
///     type Options = ();
///
///     fn help(&self) -> &str {
///         "Initialize a project"
///     }
///
///     fn run(&self, _: &(), _: &Invocation<'_>) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let commands = vec![CommandNode::new("init", Noop).unwrap()];
/// let text = PlainHelp.render("mycli", &commands, &[]);
/// assert!(text.starts_with("Usage: mycli <command> <subcommand> [args] [options]"));
/// assert!(text.contains("Initialize a project"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHelp;

impl HelpRenderer for PlainHelp {
    fn render(&self, app_name: &str, commands: &[CommandNode], chain: &[String]) -> String {
        let mut lines = vec![
            format!("Usage: {app_name} <command> <subcommand> [args] [options]"),
            String::new(),
        ];

        if chain.is_empty() {
            lines.extend(all_commands(commands));
        } else {
            lines.extend(single_command(commands, chain));
        }

        lines.push(String::new());
        lines.push("Global Options:".to_string());
        lines.extend(option_lines(&GlobalOptions::default().fields()));

        lines.join("\n")
    }
}

fn all_commands(commands: &[CommandNode]) -> Vec<String> {
    let mut lines = vec![
        "Options can be passed before or after the command and subcommand.".to_string(),
        "Both -[opt] <arg> and --[opt]=<arg> are supported.".to_string(),
        "Boolean flags can be passed without an argument to set them to true.".to_string(),
        String::new(),
        "Commands:".to_string(),
    ];

    let mut rows = Vec::new();
    for command in commands {
        rows.push((command.name().to_string(), command.help().to_string()));
        for sub in command.children() {
            rows.push((format!("{} {}", command.name(), sub.name()), sub.help().to_string()));
        }
    }

    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, help) in rows {
        lines.push(format!("  {name:<width$}  {help}").trim_end().to_string());
    }

    lines
}

fn single_command(commands: &[CommandNode], chain: &[String]) -> Vec<String> {
    let Some(command) = find_by_chain(commands, chain) else {
        return vec![format!("Command not found: {}", chain.join(" "))];
    };

    let mut lines = Vec::new();
    if !command.help().is_empty() {
        lines.push(command.help().to_string());
    }
    lines.push(format!("$ {}", chain.join(" ")));

    let fields = command.fields();
    if !fields.is_empty() {
        lines.push(String::new());
        lines.push("Options:".to_string());
        lines.extend(option_lines(&fields));
    }

    if !command.children().is_empty() {
        lines.push(String::new());
        lines.push("Subcommands:".to_string());
        let width = command
            .children()
            .iter()
            .map(|c| c.name().len())
            .max()
            .unwrap_or(0);
        for sub in command.children() {
            lines.push(
                format!("  {:<width$}  {}", sub.name(), sub.help())
                    .trim_end()
                    .to_string(),
            );
        }
    }

    lines
}

/// One line per field; groups list their nested fields with dotted keys.
fn option_lines(fields: &[OptionField]) -> Vec<String> {
    let mut rows = Vec::new();
    collect_rows(fields, "", "", &mut rows);

    let width = rows.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    rows.into_iter()
        .map(|(usage, help)| format!("  {usage:<width$}   {help}").trim_end().to_string())
        .collect()
}

fn collect_rows(
    fields: &[OptionField],
    long_prefix: &str,
    short_prefix: &str,
    rows: &mut Vec<(String, String)>,
) {
    for field in fields {
        let mut help = field.help.clone().unwrap_or_default();
        if let Some(default) = &field.default {
            help = format!("{help} (default: {default})").trim_start().to_string();
        }

        if field.kind == ValueKind::Group {
            let short = field.short.as_deref().unwrap_or(&field.long);
            rows.push((format!("--{long_prefix}{}.*", field.long), help));
            collect_rows(
                &field.fields,
                &format!("{long_prefix}{}.", field.long),
                &format!("{short_prefix}{short}."),
                rows,
            );
            continue;
        }

        let usage = match (field.position, field.short.as_deref()) {
            (Some(index), _) => format!("arg{} <{}>", index + 1, field.long),
            (None, Some(short)) => format!(
                "-{short_prefix}{short}, --{long_prefix}{}{}",
                field.long,
                value_hint(field.kind)
            ),
            (None, None) => format!("--{long_prefix}{}{}", field.long, value_hint(field.kind)),
        };
        rows.push((usage, help));
    }
}

fn value_hint(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Bool | ValueKind::Group => "",
        ValueKind::String => " <value>",
        ValueKind::Number => " <n>",
        ValueKind::List => " <value>...",
    }
}
