use std::cell::RefCell;
use std::rc::Rc;

use command_tree::{
    App, Command, DisplaySubcommands, GlobalOptions, Invocation, Outcome, ParentCommand,
    RegistrationError, RunError, Settings, Unknowns,
};
use command_tree_core::{
    BindError, FieldViolation, OptionField, OptionMap, OptionValue, Options, ValueKind,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
struct MockOptions {
    beep: bool,
    number: i64,
    name: String,
    target: Option<String>,
}

impl Options for MockOptions {
    fn fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::positional(0, "target", ValueKind::String),
            OptionField::flag("beep").with_short("b").with_help("Beep"),
            OptionField::value("number", ValueKind::Number)
                .with_short("n")
                .with_env("MOCK_NUMBER")
                .with_help("Number"),
            OptionField::value("name", ValueKind::String).with_default("anon"),
        ]
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
        match key {
            "beep" => self.beep = value.coerce(key)?,
            "number" => self.number = value.coerce(key)?,
            "name" => self.name = value.coerce(key)?,
            "target" => self.target = value.coerce(key)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Call {
    chain: Vec<String>,
    options: MockOptions,
    unknowns: Unknowns,
    globals: GlobalOptions,
}

type Calls = Rc<RefCell<Vec<Call>>>;

struct MockCommand {
    calls: Calls,
    fail: Option<&'static str>,
}

impl MockCommand {
    fn new(calls: &Calls) -> Self {
        Self {
            calls: Rc::clone(calls),
            fail: None,
        }
    }

    fn failing(calls: &Calls, message: &'static str) -> Self {
        Self {
            calls: Rc::clone(calls),
            fail: Some(message),
        }
    }
}

impl Command for MockCommand {
    type Options = MockOptions;

    fn help(&self) -> &str {
        "Mock command"
    }

    fn validate(&self, options: &OptionMap) -> Result<(), Vec<FieldViolation>> {
        match options.get("name").and_then(OptionValue::as_str) {
            Some("forbidden") => Err(vec![FieldViolation::InvalidChoice {
                field: "name".into(),
                value: "forbidden".into(),
                choices: vec!["anything else".into()],
            }]),
            _ => Ok(()),
        }
    }

    fn run(&self, options: &MockOptions, invocation: &Invocation<'_>) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call {
            chain: invocation.chain.to_vec(),
            options: options.clone(),
            unknowns: invocation.unknowns.clone(),
            globals: invocation.globals.clone(),
        });
        match self.fail {
            Some(message) => anyhow::bail!(message),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct RequiredOptions {
    id: String,
}

impl Options for RequiredOptions {
    fn fields(&self) -> Vec<OptionField> {
        vec![
            OptionField::value("id", ValueKind::String)
                .required()
                .with_pattern("^[a-z]+$"),
        ]
    }

    fn set(&mut self, key: &str, value: &OptionValue) -> Result<(), BindError> {
        if key == "id" {
            self.id = value.coerce(key)?;
        }
        Ok(())
    }
}

struct RequiredCommand;

impl Command for RequiredCommand {
    type Options = RequiredOptions;

    fn run(&self, _: &RequiredOptions, _: &Invocation<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

fn app() -> App {
    App::new(Settings::new("cli"), GlobalOptions::new("/start"))
}

/// `help`, `help2`, `init` and `init sub`, all recording into `calls`.
fn app_with_commands(calls: &Calls) -> App {
    let mut app = app();
    app.add("help", MockCommand::new(calls)).unwrap();
    app.add("help2", MockCommand::new(calls)).unwrap();
    app.add("init", MockCommand::new(calls))
        .unwrap()
        .add("sub", MockCommand::new(calls))
        .unwrap();
    app
}

fn run(app: &mut App, args: &[&str]) -> Result<Outcome, RunError> {
    app.run_with_env(args.iter().copied(), Vec::new())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Setup and empty invocations
// ---------------------------------------------------------------------------

#[test]
fn test_no_commands_fails_before_tokenizing() {
    let mut app = app();
    assert!(matches!(
        run(&mut app, &["help", "-v", "not-a-number"]),
        Err(RunError::NoCommandsRegistered)
    ));
    assert!(matches!(run(&mut app, &[]), Err(RunError::NoCommandsRegistered)));
}

#[test]
fn test_empty_invocation_shows_help() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    let outcome = run(&mut app, &[]).unwrap();
    assert!(matches!(outcome, Outcome::Help(text) if text.contains("Commands:")));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_empty_invocation_forbidden() {
    let calls = Calls::default();
    let mut app = App::new(
        Settings::new("cli").with_forbid_empty_invocation(true),
        GlobalOptions::default(),
    );
    app.add("help", MockCommand::new(&calls)).unwrap();

    assert!(matches!(run(&mut app, &[]), Err(RunError::NoArguments)));
}

#[test]
fn test_empty_invocation_runs_default_from_env_only() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);
    app.set_default(MockCommand::new(&calls)).unwrap();

    let env = vec![
        ("MOCK_NUMBER".to_string(), "7".to_string()),
        ("HOME".to_string(), "/home/me".to_string()),
    ];
    let outcome = app.run_with_env(Vec::<String>::new(), env).unwrap();

    assert_eq!(outcome, Outcome::Completed);
    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].chain.is_empty());
    assert_eq!(calls[0].options.number, 7);
    assert_eq!(calls[0].options.name, "anon");
    assert_eq!(calls[0].unknowns, Unknowns::default());
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn test_help_by_command_name_runs_the_command() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    assert_eq!(run(&mut app, &["help"]).unwrap(), Outcome::Completed);
    assert_eq!(calls.borrow()[0].chain, strings(&["help"]));
}

#[test]
fn test_help_flag_short_circuits_resolved_command() {
    for flag in ["--help", "-h"] {
        let calls = Calls::default();
        let mut app = app_with_commands(&calls);

        let outcome = run(&mut app, &["init", "sub", flag]).unwrap();
        assert!(matches!(&outcome, Outcome::Help(text) if text.contains("$ init sub")));
        assert!(calls.borrow().is_empty());
    }
}

#[test]
fn test_help_flag_without_command_lists_everything() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    let outcome = run(&mut app, &["--help"]).unwrap();
    assert!(matches!(&outcome, Outcome::Help(text) if text.contains("init sub")));

    let outcome = run(&mut app, &["-v", "2", "-h"]).unwrap();
    assert!(matches!(outcome, Outcome::Help(_)));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_help_flag_with_unknown_command_is_still_not_found() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    for args in [&["beep", "--help"][..], &["beep", "-h"][..], &["-h", "beep"][..]] {
        let err = run(&mut app, args).unwrap_err();
        assert!(matches!(err, RunError::CommandNotFound { .. }));
        assert!(err.help_shown());
        assert!(err.help_text().unwrap().contains("Commands:"));
    }
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_unknown_command_returns_help_with_error() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    for args in [&["beep"][..], &["beep", "--boop"][..]] {
        let err = run(&mut app, args).unwrap_err();
        assert!(matches!(err, RunError::CommandNotFound { .. }));
        assert!(err.help_shown());
        assert!(err.help_text().unwrap().starts_with("Usage: cli"));
    }
    assert!(calls.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// Global options
// ---------------------------------------------------------------------------

#[test]
fn test_global_options_bind_by_long_and_short() {
    for cwd_key in ["--cwd", "--c", "-c"] {
        let calls = Calls::default();
        let mut app = app_with_commands(&calls);

        run(&mut app, &["help", cwd_key, "/temp/dir", "-v", "2"]).unwrap();
        assert_eq!(app.global_options().cwd, "/temp/dir");
        assert_eq!(app.global_options().verbosity, 2);
        assert_eq!(calls.borrow()[0].globals.verbosity, 2);
    }
}

#[test]
fn test_global_options_bind_even_when_command_is_missing() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    let _ = run(&mut app, &["nothing", "--cwd", "/tmp/dir", "-v", "2"]);
    assert_eq!(app.global_options().cwd, "/tmp/dir");
    assert_eq!(app.global_options().verbosity, 2);
}

#[test]
fn test_global_options_reset_between_runs() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    run(&mut app, &["help", "-v", "2"]).unwrap();
    run(&mut app, &["help"]).unwrap();
    assert_eq!(app.global_options().verbosity, 0);
    assert_eq!(app.global_options().cwd, "/start");
}

#[test]
fn test_global_binding_failure() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    let err = run(&mut app, &["help", "-v", "loud"]).unwrap_err();
    assert!(matches!(
        err,
        RunError::GlobalBindingFailed(BindError::InvalidValue { ref field, .. })
            if field == "verbosity"
    ));
}

#[test]
fn test_global_tokens_reach_command_as_unknowns() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    run(&mut app, &["help", "--cwd", "/x", "extra"]).unwrap();
    let calls = calls.borrow();
    assert_eq!(calls[0].unknowns.options["cwd"], OptionValue::from("/x"));
    assert_eq!(calls[0].options.target.as_deref(), Some("extra"));
}

// ---------------------------------------------------------------------------
// Subcommands and local binding
// ---------------------------------------------------------------------------

#[test]
fn test_sub_command_with_globals() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    run(&mut app, &["init", "sub", "--c", "/temp/dir", "-v", "2"]).unwrap();
    assert_eq!(app.global_options().cwd, "/temp/dir");
    assert_eq!(app.global_options().verbosity, 2);
    assert_eq!(calls.borrow()[0].chain, strings(&["init", "sub"]));
}

#[test]
fn test_descent_stops_at_first_non_command() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    run(&mut app, &["init", "x", "sub"]).unwrap();
    let calls = calls.borrow();
    assert_eq!(calls[0].chain, strings(&["init"]));
    assert_eq!(calls[0].options.target.as_deref(), Some("x"));
    assert_eq!(calls[0].unknowns.args, strings(&["sub"]));
}

#[test]
fn test_local_options_bind_with_env_fallback() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);
    let env = vec![("MOCK_NUMBER".to_string(), "3".to_string())];

    app.run_with_env(["init", "-b", "--name", "zed"], env.clone())
        .unwrap();
    app.run_with_env(["init", "-n", "9"], env).unwrap();

    let calls = calls.borrow();
    assert_eq!(
        calls[0].options,
        MockOptions {
            beep: true,
            number: 3,
            name: "zed".into(),
            target: None,
        }
    );
    // command line wins over the environment
    assert_eq!(calls[1].options.number, 9);
    assert!(!calls[1].options.beep);
    assert_eq!(calls[1].options.name, "anon");
}

#[test]
fn test_key_value_tokens_are_split() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    run(&mut app, &["init", "--number=5", "--cwd=/kv"]).unwrap();
    assert_eq!(calls.borrow()[0].options.number, 5);
    assert_eq!(app.global_options().cwd, "/kv");
}

#[test]
fn test_key_value_split_can_be_disabled() {
    let calls = Calls::default();
    let mut app = App::new(
        Settings::new("cli").with_split_key_value(false),
        GlobalOptions::default(),
    );
    app.add("init", MockCommand::new(&calls)).unwrap();

    run(&mut app, &["init", "--number=5"]).unwrap();
    let calls = calls.borrow();
    assert_eq!(calls[0].options.number, 0);
    assert_eq!(
        calls[0].unknowns.options["number=5"],
        OptionValue::Flag(true)
    );
}

#[test]
fn test_repeated_runs_bind_identically() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);
    let args = ["init", "t", "-n", "4", "--zzz", "q"];

    run(&mut app, &args).unwrap();
    run(&mut app, &args).unwrap();

    let calls = calls.borrow();
    assert_eq!(calls[0], calls[1]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_binding_failure_names_field_and_chain() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    let err = run(&mut app, &["init", "sub", "--number", "lots"]).unwrap_err();
    match err {
        RunError::BindingFailed { chain, source } => {
            assert_eq!(chain, "init sub");
            assert_eq!(
                source,
                BindError::InvalidValue {
                    field: "number".into(),
                    value: "lots".into(),
                    expected: "integer",
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_command_validation_runs_before_binding() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    let err = run(&mut app, &["init", "--name", "forbidden"]).unwrap_err();
    assert!(matches!(
        &err,
        RunError::ValidationFailed { chain, violations } if chain == "init" && violations.len() == 1
    ));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_field_rules_are_enforced() {
    let mut app = app();
    app.add("get", RequiredCommand).unwrap();

    let err = run(&mut app, &["get"]).unwrap_err();
    assert!(matches!(
        &err,
        RunError::ValidationFailed { violations, .. }
            if violations == &vec![FieldViolation::Missing { field: "id".into() }]
    ));

    let err = run(&mut app, &["get", "--id", "A1"]).unwrap_err();
    assert!(err.to_string().contains("does not match"));

    assert_eq!(run(&mut app, &["get", "--id", "abc"]).unwrap(), Outcome::Completed);
}

#[test]
fn test_handler_failure_is_wrapped_with_chain() {
    let calls = Calls::default();
    let mut app = app();
    app.add("init", MockCommand::new(&calls))
        .unwrap()
        .add("sub", MockCommand::failing(&calls, "boom"))
        .unwrap();

    let err = run(&mut app, &["init", "sub"]).unwrap_err();
    assert_eq!(err.to_string(), "failed to run command: init sub: boom");
    assert_eq!(err.chain(), Some("init sub"));
    assert!(!err.help_shown());
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_parent_command_shows_its_subcommands() {
    let calls = Calls::default();
    let mut app = app();
    app.add("remote", ParentCommand::new("Manage remotes"))
        .unwrap()
        .add("add", MockCommand::new(&calls))
        .unwrap();

    let outcome = run(&mut app, &["remote"]).unwrap();
    match outcome {
        Outcome::Help(text) => {
            assert!(text.contains("$ remote"));
            assert!(text.contains("Subcommands:"));
            assert!(text.contains("add  Mock command"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(calls.borrow().is_empty());

    assert_eq!(run(&mut app, &["remote", "add"]).unwrap(), Outcome::Completed);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_handler_can_ask_for_subcommands() {
    struct Maybe;

    impl Command for Maybe {
        type Options = MockOptions;

        fn run(&self, options: &MockOptions, _: &Invocation<'_>) -> anyhow::Result<()> {
            if options.target.is_none() {
                return Err(DisplaySubcommands.into());
            }
            Ok(())
        }
    }

    let mut app = app();
    app.add("db", Maybe).unwrap();

    let outcome = run(&mut app, &["db"]).unwrap();
    assert!(matches!(outcome, Outcome::Help(text) if text.contains("$ db")));
    assert_eq!(run(&mut app, &["db", "main"]).unwrap(), Outcome::Completed);
}

#[test]
fn test_default_command_can_show_all_commands() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);
    app.set_default(ParentCommand::default()).unwrap();

    let outcome = run(&mut app, &[]).unwrap();
    assert!(matches!(outcome, Outcome::Help(text) if text.contains("Commands:")));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let calls = Calls::default();
    let mut app = app_with_commands(&calls);

    assert_eq!(
        app.add("help", MockCommand::new(&calls)).unwrap_err(),
        RegistrationError::DuplicateName("help".into())
    );
    assert_eq!(app.commands().len(), 3);
}
