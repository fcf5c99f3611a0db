//! The `routes` management command.
//!
//! Lists the configured routes in matching order together with the views
//! registered for each.

use std::fmt::Write as _;

use async_trait::async_trait;
use pylons_rs_config::Registry;
use pylons_rs_core::{PylonsError, Settings};
use pylons_rs_http::SharedPredicate;

use crate::command::ManagementCommand;
use crate::commands::configure_app;

/// Prints the route table.
pub struct RoutesCommand;

fn predicate_list(predicates: &[SharedPredicate]) -> String {
    if predicates.is_empty() {
        return String::new();
    }
    let texts: Vec<String> = predicates.iter().map(|p| p.text()).collect();
    format!(" [{}]", texts.join(", "))
}

/// Renders the route table of `registry`.
///
/// One line per route (`name path [predicates]`), followed by one indented
/// line per view (`-> handler.attr [predicates]`). The default entry point
/// shows as the bare handler name.
pub fn format_routes(registry: &Registry) -> String {
    let mut out = String::new();
    for route in registry.routes() {
        let _ = writeln!(
            out,
            "{} {}{}",
            route.name(),
            route.path(),
            predicate_list(route.predicates())
        );
        for view in registry.views_for_route(route.name()) {
            let target = view.attr.as_ref().map_or_else(
                || view.view.name().to_string(),
                |attr| format!("{}.{attr}", view.view.name()),
            );
            let _ = writeln!(
                out,
                "    -> {target}{}",
                predicate_list(&view.custom_predicates)
            );
        }
    }
    out
}

#[async_trait]
impl ManagementCommand for RoutesCommand {
    fn name(&self) -> &'static str {
        "routes"
    }

    fn help(&self) -> &'static str {
        "List routes and their views"
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), PylonsError> {
        let config = configure_app(matches, settings)?;
        let table = format_routes(config.registry());
        if table.is_empty() {
            tracing::info!("No routes configured");
        } else {
            print!("{table}");
        }
        Ok(())
    }
}
