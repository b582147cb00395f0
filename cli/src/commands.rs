//! Commands registered by the `cmdtree` binary.

use command_tree::{Command, Invocation};
use command_tree_core::{
    BindError, FieldViolation, OptionField, OptionMap, OptionValue, Options, ValueKind, group_key,
};
use serde::Serialize;
use tracing::info;

/// `cmdtree help [command...]`
pub struct HelpCommand;

impl Command for HelpCommand {
    type Options = ();

    fn help(&self) -> &str {
        "Display help"
    }

    fn run(&self, _: &(), invocation: &Invocation<'_>) -> anyhow::Result<()> {
        // `help init sub` leaves `init sub` as unknown positionals
        println!("{}", invocation.render_help(&invocation.unknowns.args));
        Ok(())
    }
}

/// `cmdtree tools version`
pub struct VersionCommand;

impl Command for VersionCommand {
    type Options = ();

    fn help(&self) -> &str {
        "Print the cmdtree version"
    }

    fn run(&self, _: &(), _: &Invocation<'_>) -> anyhow::Result<()> {
        println!("cmdtree {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ExampleOptions {
    verbose: bool,
}

impl Options for ExampleOptions {
    fn fields(&self) -> Vec<OptionField> {
        vec![OptionField::flag("verbose").with_help("Verbose output")]
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
        if key == "verbose" {
            self.verbose = value.coerce(key)?;
        }
        Ok(())
    }
}

pub struct ExampleCommand;

impl Command for ExampleCommand {
    type Options = ExampleOptions;

    fn help(&self) -> &str {
        "Example command"
    }

    fn run(&self, options: &ExampleOptions, invocation: &Invocation<'_>) -> anyhow::Result<()> {
        println!("Example command");
        if options.verbose {
            println!("cwd: {}", invocation.globals.cwd);
            println!("args: {:?}", invocation.unknowns.args);
            for (key, value) in &invocation.unknowns.options {
                println!("option: {key}={value}");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InitOptions {
    name: Option<String>,
    test: bool,
}

impl Options for InitOptions {
    fn fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::positional(0, "name", ValueKind::String).with_help("Project name"),
            OptionField::flag("test").with_short("t").with_help("Test flag"),
        ]
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
        match key {
            "name" => self.name = value.coerce(key)?,
            "test" => self.test = value.coerce(key)?,
            _ => {}
        }
        Ok(())
    }
}

/// `cmdtree init [name]`
pub struct InitCommand;

impl Command for InitCommand {
    type Options = InitOptions;

    fn help(&self) -> &str {
        "Initialize a project"
    }

    fn run(&self, options: &InitOptions, invocation: &Invocation<'_>) -> anyhow::Result<()> {
        let name = options.name.as_deref().unwrap_or("project");
        println!("Init command: {name} in {}", invocation.globals.cwd);
        if options.test {
            println!("test mode");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InitSubOptions {
    template: String,
}

impl Options for InitSubOptions {
    fn fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::value("template", ValueKind::String)
                .with_short("t")
                .with_choices(&["basic", "full"])
                .with_default("basic")
                .with_help("Template to use"),
        ]
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
        if key == "template" {
            self.template = value.coerce(key)?;
        }
        Ok(())
    }
}

/// `cmdtree init sub`
pub struct InitSubCommand;

impl Command for InitSubCommand {
    type Options = InitSubOptions;

    fn help(&self) -> &str {
        "Initialize a sub-project"
    }

    fn run(&self, options: &InitSubOptions, _: &Invocation<'_>) -> anyhow::Result<()> {
        println!("Init sub command: template {}", options.template);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Features {
    mode: String,
    billing: bool,
    admin: bool,
    users: bool,
    preview: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct DemoOptions {
    copyright: String,
    json: bool,
    features: Features,
}

impl Options for DemoOptions {
    fn fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::value("copy", ValueKind::String)
                .with_env("DEMO_COPY")
                .with_default("Demo Basic Inc.")
                .with_help("Copyright line"),
            OptionField::flag("json").with_help("Print the bound options as JSON"),
            OptionField::group(
                "features",
                vec![
                    OptionField::value("mode", ValueKind::String)
                        .with_short("m")
                        .with_env("DEMO_MODE")
                        .with_default("basic")
                        .with_help("Feature mode name"),
                    OptionField::flag("billing")
                        .with_short("b")
                        .with_default("true")
                        .with_help("Billing feature"),
                    OptionField::flag("admin")
                        .with_short("a")
                        .with_default("false")
                        .with_help("Admin feature"),
                    OptionField::flag("users")
                        .with_short("u")
                        .with_default("true")
                        .with_help("Users feature"),
                    OptionField::flag("preview")
                        .with_short("p")
                        .with_default("false")
                        .with_help("Preview feature"),
                ],
            )
            .with_short("f")
            .with_help("Features"),
        ]
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
        if let Some(nested) = group_key(key, "features") {
            let features = &mut self.features;
            match nested {
                "mode" => features.mode = value.coerce(key)?,
                "billing" => features.billing = value.coerce(key)?,
                "admin" => features.admin = value.coerce(key)?,
                "users" => features.users = value.coerce(key)?,
                "preview" => features.preview = value.coerce(key)?,
                _ => {}
            }
            return Ok(());
        }
        match key {
            "copy" => self.copyright = value.coerce(key)?,
            "json" => self.json = value.coerce(key)?,
            _ => {}
        }
        Ok(())
    }
}

/// `cmdtree demo -f.a -f.p --features.mode full`
pub struct DemoCommand;

impl Command for DemoCommand {
    type Options = DemoOptions;

    fn help(&self) -> &str {
        "Demo app command"
    }

    fn validate(&self, options: &OptionMap) -> Result<(), Vec<FieldViolation>> {
        // `-f.m` as the last token binds an empty mode
        match options.get("features.mode").and_then(OptionValue::as_str) {
            Some("") => Err(vec![FieldViolation::Missing {
                field: "features.mode".into(),
            }]),
            _ => Ok(()),
        }
    }

    fn run(&self, options: &DemoOptions, invocation: &Invocation<'_>) -> anyhow::Result<()> {
        if options.json {
            println!("{}", serde_json::to_string_pretty(options)?);
            return Ok(());
        }

        let features = &options.features;
        let enabled: Vec<&str> = [
            ("billing", features.billing),
            ("admin", features.admin),
            ("users", features.users),
            ("preview", features.preview),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect();

        for name in &enabled {
            info!(feature = *name, "feature enabled");
        }
        info!(copy = %options.copyright, mode = %features.mode, "running application");

        println!("{} ({})", options.copyright, features.mode);
        if invocation.globals.verbosity > 0 {
            println!("features: {}", enabled.join(", "));
        }
        Ok(())
    }
}
