//! Management command framework.
//!
//! This module provides the [`ManagementCommand`] trait for defining CLI
//! commands and [`CommandRegistry`] for registering and dispatching them.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use pylons_rs_cli::command::ManagementCommand;
//! use pylons_rs_core::{PylonsError, Settings};
//!
//! struct GreetCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for GreetCommand {
//!     fn name(&self) -> &str { "greet" }
//!     fn help(&self) -> &str { "Say hello" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         _settings: &Settings,
//!     ) -> Result<(), PylonsError> {
//!         println!("Hello from pylons-rs!");
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use pylons_rs_core::{PylonsError, PylonsResult, Settings};

/// The global option naming the application config file.
pub const APP_ARG: &str = "app";

/// The application config file used when `--app` is not given.
pub const DEFAULT_APP_CONFIG: &str = "app.toml";

/// A management command that can be registered and invoked through the CLI.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Returns the name of this command (used to invoke it from the CLI).
    fn name(&self) -> &str;

    /// Returns a short help description for this command.
    fn help(&self) -> &str;

    /// Adds custom arguments to the clap command.
    ///
    /// The default implementation returns the command unchanged.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Executes the command with the given argument matches and settings.
    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), PylonsError>;
}

/// The management commands known to the CLI, in name order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, replacing any command of the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name().to_string(), command);
    }

    /// Returns the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns the registered command names in order.
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap `Command` with one subcommand per command.
    ///
    /// Every subcommand accepts the global `--app <path>` option.
    pub fn build_cli(&self) -> clap::Command {
        let app = clap::Command::new("pylons-rs")
            .about("pylons-rs management utility")
            .subcommand_required(true)
            .arg(
                clap::Arg::new(APP_ARG)
                    .long(APP_ARG)
                    .global(true)
                    .default_value(DEFAULT_APP_CONFIG)
                    .help("Application config file (TOML or JSON)"),
            );

        self.commands.iter().fold(app, |app, (name, cmd)| {
            // clap wants `&'static str` names; commands are registered once at startup.
            let name: &'static str = Box::leak(name.clone().into_boxed_str());
            app.subcommand(cmd.add_arguments(clap::Command::new(name).about(cmd.help().to_string())))
        })
    }

    /// Dispatches parsed matches to the selected command.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> PylonsResult<()> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| PylonsError::configuration("No subcommand specified"))?;
        let cmd = self
            .get(name)
            .ok_or_else(|| PylonsError::configuration(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "Running management command");
        cmd.handle(sub_matches, settings).await
    }

    /// Parses `args` (program name first) and runs the selected command.
    ///
    /// # Errors
    ///
    /// Returns a configuration error carrying clap's message if the arguments
    /// do not parse, or whatever the command returns.
    pub async fn run_from<I, T>(&self, args: I, settings: &Settings) -> PylonsResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = self
            .build_cli()
            .try_get_matches_from(args)
            .map_err(|e| PylonsError::configuration(e.to_string()))?;
        self.execute(&matches, settings).await
    }
}

/// Returns the `--app` path from a command's matches.
pub fn app_path(matches: &clap::ArgMatches) -> &str {
    matches
        .get_one::<String>(APP_ARG)
        .map_or(DEFAULT_APP_CONFIG, String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCommand {
        cmd_name: String,
    }

    impl TestCommand {
        fn new(name: &str) -> Self {
            Self {
                cmd_name: name.to_string(),
            }
        }
    }

    #[async_trait]
    impl ManagementCommand for TestCommand {
        fn name(&self) -> &str {
            &self.cmd_name
        }

        fn help(&self) -> &'static str {
            "A test command"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(
                clap::Arg::new("verbose")
                    .long("verbose")
                    .action(clap::ArgAction::SetTrue),
            )
        }

        async fn handle(
            &self,
            _matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> Result<(), PylonsError> {
            Ok(())
        }
    }

    struct FailingCommand;

    #[async_trait]
    impl ManagementCommand for FailingCommand {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn help(&self) -> &'static str {
            "A command that always fails"
        }

        async fn handle(
            &self,
            _matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> Result<(), PylonsError> {
            Err(PylonsError::configuration("deliberate failure"))
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        assert_eq!(registry.len(), 1);

        let cmd = registry.get("test").unwrap();
        assert_eq!(cmd.name(), "test");
        assert_eq!(cmd.help(), "A test command");
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_list_commands_sorted() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("url")));
        registry.register(Box::new(TestCommand::new("check")));
        registry.register(Box::new(TestCommand::new("routes")));

        assert_eq!(registry.list_commands(), vec!["check", "routes", "url"]);
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        registry.register(Box::new(TestCommand::new("test")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_build_cli_with_arguments() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["pylons-rs", "test", "--verbose"])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "test");
        assert!(sub_matches.get_flag("verbose"));
    }

    #[test]
    fn test_app_arg_is_global() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        let cli = registry.build_cli();

        let matches = cli
            .clone()
            .try_get_matches_from(["pylons-rs", "test", "--app", "site.json"])
            .unwrap();
        let (_, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(app_path(sub_matches), "site.json");

        let matches = cli.try_get_matches_from(["pylons-rs", "test"]).unwrap();
        let (_, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(app_path(sub_matches), DEFAULT_APP_CONFIG);
    }

    #[test]
    fn test_subcommand_required() {
        let registry = CommandRegistry::new();
        assert!(registry.build_cli().try_get_matches_from(["pylons-rs"]).is_err());
    }

    #[tokio::test]
    async fn test_run_from() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        let settings = Settings::new();

        assert!(registry.run_from(["pylons-rs", "test"], &settings).await.is_ok());
        let err = registry.run_from(["pylons-rs", "bogus"], &settings).await.unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(FailingCommand));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["pylons-rs", "fail"])
            .unwrap();
        let err = registry.execute(&matches, &Settings::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: deliberate failure");
    }
}
