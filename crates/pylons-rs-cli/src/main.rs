//! The `pylons-rs` management binary.

use std::process::ExitCode;

use pylons_rs_cli::command::{app_path, CommandRegistry};
use pylons_rs_cli::commands::register_builtin_commands;
use pylons_rs_cli::AppConfig;
use pylons_rs_core::logging::setup_logging;
use pylons_rs_core::{settings_loader, PylonsResult};

async fn run() -> PylonsResult<()> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    // Settings come from the app config when it exists, so logging can be
    // configured before any command runs.
    let path = matches
        .subcommand()
        .map_or_else(|| app_path(&matches), |(_, sub)| app_path(sub));
    let settings = if std::path::Path::new(path).exists() {
        AppConfig::from_file(path)?.load_settings()?
    } else {
        settings_loader::from_env()
    };
    setup_logging(&settings);

    registry.execute(&matches, &settings).await
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
