//! Built-in management commands.
//!
//! Each command implements [`ManagementCommand`](crate::command::ManagementCommand)
//! and works on the application described by the `--app` config file.

pub mod check;
pub mod routes;
pub mod url;

pub use check::CheckCommand;
pub use routes::RoutesCommand;
pub use url::UrlCommand;

use pylons_rs_config::Configurator;
use pylons_rs_core::{PylonsResult, Settings};

use crate::app_config::AppConfig;
use crate::command::{app_path, CommandRegistry};

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(RoutesCommand));
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(UrlCommand));
}

/// Reads the `--app` config and replays it onto a configurator.
pub(crate) fn configure_app(
    matches: &clap::ArgMatches,
    settings: &Settings,
) -> PylonsResult<Configurator> {
    AppConfig::from_file(app_path(matches))?.configure(settings.clone())
}
