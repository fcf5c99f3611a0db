//! The `url` management command.
//!
//! Generates the URL of a named route from `key=value` arguments.

use std::collections::HashMap;
use std::hash::BuildHasher;

use async_trait::async_trait;
use pylons_rs_config::Registry;
use pylons_rs_core::{PylonsError, PylonsResult, Settings};

use crate::command::ManagementCommand;
use crate::commands::configure_app;

/// Prints the URL generated for a route.
pub struct UrlCommand;

/// Splits `key=value` arguments into generation keywords.
///
/// # Errors
///
/// Returns a configuration error for an argument without `=`.
pub fn parse_kwargs<'a>(
    args: impl IntoIterator<Item = &'a str>,
) -> PylonsResult<HashMap<&'a str, &'a str>> {
    args.into_iter()
        .map(|arg| {
            arg.split_once('=').ok_or_else(|| {
                PylonsError::configuration(format!("Expected key=value, got '{arg}'"))
            })
        })
        .collect()
}

/// Generates the URL of `route_name` in `registry`.
///
/// # Errors
///
/// Returns a not-found error for an unknown route, or a configuration error
/// if a placeholder has no value.
pub fn generate_url<S: BuildHasher>(
    registry: &Registry,
    route_name: &str,
    kwargs: &HashMap<&str, &str, S>,
) -> PylonsResult<String> {
    registry.routes_mapper().generate(route_name, kwargs)
}

#[async_trait]
impl ManagementCommand for UrlCommand {
    fn name(&self) -> &'static str {
        "url"
    }

    fn help(&self) -> &'static str {
        "Generate the URL of a named route"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("route")
                .required(true)
                .help("Route name"),
        )
        .arg(
            clap::Arg::new("params")
                .num_args(0..)
                .help("Placeholder values as key=value"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), PylonsError> {
        let route = matches
            .get_one::<String>("route")
            .ok_or_else(|| PylonsError::configuration("Missing route name"))?;
        let kwargs = parse_kwargs(
            matches
                .get_many::<String>("params")
                .into_iter()
                .flatten()
                .map(String::as_str),
        )?;

        let config = configure_app(matches, settings)?;
        println!("{}", generate_url(config.registry(), route, &kwargs)?);
        Ok(())
    }
}
