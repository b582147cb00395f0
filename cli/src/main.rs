mod commands;

use std::process::ExitCode;

use command_tree::{App, GlobalOptions, Outcome, ParentCommand, RunError, Settings};
use tracing::debug;

use crate::commands::{
    DemoCommand, ExampleCommand, HelpCommand, InitCommand, InitSubCommand, VersionCommand,
};

const APP_NAME: &str = "cmdtree";

/// Exit code when no command matched and help was printed instead.
const EXIT_NOT_FOUND: u8 = 2;

fn main() -> ExitCode {
    // stdout carries command output and help
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("error: failed to get current working directory: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = match build_app(&cwd) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = app.run(std::env::args().skip(1));
    debug!(globals = ?app.global_options(), "run finished");
    report(result)
}

fn build_app(cwd: &str) -> anyhow::Result<App> {
    let mut app = App::new(Settings::new(APP_NAME), GlobalOptions::new(cwd));
    app.add("help", HelpCommand)?;
    app.add("example", ExampleCommand)?;
    app.add("init", InitCommand)?.add("sub", InitSubCommand)?;
    app.add("demo", DemoCommand)?;
    app.add("tools", ParentCommand::new("Maintenance tools"))?
        .add("version", VersionCommand)?;
    Ok(app)
}

fn report(result: Result<Outcome, RunError>) -> ExitCode {
    match result {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Help(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => match err.help_text() {
            Some(help) => {
                println!("{help}");
                eprintln!("error: {err}");
                ExitCode::from(EXIT_NOT_FOUND)
            }
            None => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}
