//! The `check` management command.
//!
//! Replays the application config and inspects the result for problems:
//! registration errors, routes nobody answers, shadowed route names, and
//! handlers that are declared but never attached.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use pylons_rs_config::Registry;
use pylons_rs_core::{PylonsError, Settings};

use crate::app_config::AppConfig;
use crate::command::{app_path, ManagementCommand};

/// Runs configuration checks.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level of this check result.
    pub level: CheckLevel,
    /// A human-readable description of the issue.
    pub msg: String,
    /// An optional hint for how to resolve the issue.
    pub hint: Option<String>,
    /// A unique identifier for this check (e.g. "routes.W001").
    pub id: String,
}

/// Severity levels for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// Informational message.
    Info,
    /// A warning that may indicate a problem.
    Warning,
    /// An error that must be resolved.
    Error,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl CheckMessage {
    fn new(level: CheckLevel, id: &str, msg: String, hint: Option<&str>) -> Self {
        Self {
            level,
            msg,
            hint: hint.map(str::to_string),
            id: id.to_string(),
        }
    }
}

/// Runs every check against `app` configured with `settings`.
///
/// A registration failure is reported as `config.E001` and stops the
/// remaining checks, which need a complete registry.
pub fn run_checks(app: &AppConfig, settings: &Settings) -> Vec<CheckMessage> {
    let config = match app.configure(settings.clone()) {
        Ok(config) => config,
        Err(err) => {
            return vec![CheckMessage::new(
                CheckLevel::Error,
                "config.E001",
                err.to_string(),
                Some("Fix the application config before running other checks"),
            )]
        }
    };
    let mut messages = check_registry(config.registry());
    messages.extend(check_unused_handlers(app));
    messages
}

fn check_registry(registry: &Registry) -> Vec<CheckMessage> {
    let mut messages = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for route in registry.routes() {
        *seen.entry(route.name().to_string()).or_default() += 1;
    }
    let mut reported = BTreeSet::new();
    for route in registry.routes() {
        let name = route.name();
        if seen.get(name).copied().unwrap_or_default() > 1 && reported.insert(name.to_string()) {
            messages.push(CheckMessage::new(
                CheckLevel::Warning,
                "routes.W002",
                format!("Route name '{name}' is registered more than once"),
                Some("URL generation uses the most recent registration"),
            ));
        }
    }
    for name in seen.keys().collect::<BTreeSet<_>>() {
        if registry.views_for_route(name).is_empty() {
            messages.push(CheckMessage::new(
                CheckLevel::Info,
                "routes.I001",
                format!("Route '{name}' has no views"),
                None,
            ));
        }
    }
    messages
}

fn check_unused_handlers(app: &AppConfig) -> Vec<CheckMessage> {
    let used: BTreeSet<&str> = app
        .routes
        .iter()
        .filter_map(|route| route.handler.as_deref())
        .chain(app.rest.iter().map(|rest| rest.handler.as_str()))
        .collect();
    app.handlers
        .iter()
        .filter(|handler| !used.contains(handler.name.as_str()))
        .map(|handler| {
            CheckMessage::new(
                CheckLevel::Warning,
                "handlers.W001",
                format!("Handler '{}' is declared but never attached", handler.name),
                Some("Attach it to a route or remove it"),
            )
        })
        .collect()
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check the application config"
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), PylonsError> {
        let app = AppConfig::from_file(app_path(matches))?;
        let messages = run_checks(&app, settings);

        if messages.is_empty() {
            tracing::info!("Check identified no issues");
            return Ok(());
        }

        let errors = messages.iter().filter(|m| m.level >= CheckLevel::Error).count();
        let warnings = messages.iter().filter(|m| m.level == CheckLevel::Warning).count();

        for msg in &messages {
            let hint_text = msg
                .hint
                .as_ref()
                .map_or(String::new(), |h| format!("\n\tHINT: {h}"));
            tracing::warn!("{} ({}): {}{}", msg.level, msg.id, msg.msg, hint_text);
        }

        tracing::info!(
            "Check identified {} issue(s) ({} error(s), {} warning(s))",
            messages.len(),
            errors,
            warnings
        );

        if errors > 0 {
            return Err(PylonsError::ConfigurationError(format!(
                "Check found {errors} error(s)"
            )));
        }

        Ok(())
    }
}
