//! Integration tests for the management commands.
//!
//! Tests cover: command registration, running each built-in command against
//! an application config on disk, and error propagation.

use std::path::{Path, PathBuf};

use pylons_rs_cli::command::CommandRegistry;
use pylons_rs_cli::commands::check::run_checks;
use pylons_rs_cli::commands::register_builtin_commands;
use pylons_rs_cli::commands::routes::format_routes;
use pylons_rs_cli::AppConfig;
use pylons_rs_core::{PylonsError, Settings};

const APP: &str = r#"
settings = "settings.toml"
cache = true

[helpers]
name = "site.helpers"
[helpers.values]
site_name = "Example"

[[handlers]]
name = "pages"
autoexpose = "[a-z]+"
[handlers.actions.index]
[handlers.actions.about]
[handlers.actions.contact]
expose = [{ name = "write", renderer = "contact.mak" }]

[[handlers]]
name = "messages"

[[routes]]
name = "pages"
pattern = "/pages/{action}"
handler = "pages"
request_method = "GET"

[[rest]]
plural = "messages"
singular = "message"
handler = "messages"
"#;

const SETTINGS: &str = r#"
[cache]
regions = "short, long"
expire = 60

[cache.long]
expire = 3600
"#;

fn write_app(dir: &Path) -> PathBuf {
    std::fs::write(dir.join("settings.toml"), SETTINGS).unwrap();
    let path = dir.join("app.toml");
    std::fs::write(&path, APP).unwrap();
    path
}

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    registry
}

async fn run(args: &[&str]) -> Result<(), PylonsError> {
    let args = std::iter::once("pylons-rs").chain(args.iter().copied());
    registry().run_from(args, &Settings::new()).await
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Loading the application
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_builtin_commands() {
    assert_eq!(registry().list_commands(), vec!["check", "routes", "url"]);
}

#[test]
fn test_app_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = AppConfig::from_file(write_app(dir.path())).unwrap();
    let settings = app.load_settings().unwrap();
    let config = app.configure(settings).unwrap();
    let registry = config.registry();

    assert_eq!(registry.helpers().unwrap().name(), "site.helpers");
    let regions = registry.cache_regions();
    assert_eq!(regions["short"].expire, 60);
    assert_eq!(regions["long"].expire, 3600);
    // One declared route plus the seven REST routes.
    assert_eq!(registry.routes().len(), 8);
}

#[test]
fn test_routes_table() {
    let dir = tempfile::tempdir().unwrap();
    let app = AppConfig::from_file(write_app(dir.path())).unwrap();
    let config = app.configure(Settings::new()).unwrap();
    let table = format_routes(config.registry());

    assert!(table.starts_with("pages /pages/:action [request method = GET]\n"));
    assert!(table.contains("    -> pages.about [action = about]\n"));
    assert!(table.contains("    -> pages.contact [action = write]\n"));
    assert!(table.contains("message messages/:id [request method = GET]\n"));
    assert!(table.contains("    -> messages.show\n"));
}

#[test]
fn test_clean_app_checks() {
    let dir = tempfile::tempdir().unwrap();
    let app = AppConfig::from_file(write_app(dir.path())).unwrap();
    let settings = app.load_settings().unwrap();
    assert!(run_checks(&app, &settings).is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Running commands
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_routes_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_app(dir.path());
    run(&["routes", "--app", path.to_str().unwrap()]).await.unwrap();
}

#[tokio::test]
async fn test_check_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_app(dir.path());
    run(&["check", "--app", path.to_str().unwrap()]).await.unwrap();
}

#[tokio::test]
async fn test_check_command_fails_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.toml");
    std::fs::write(&path, "[[routes]]\nname = \"x\"\nhandler = \"missing\"\npattern = \"/x\"\n")
        .unwrap();
    let err = run(&["check", "--app", path.to_str().unwrap()]).await.unwrap_err();
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn test_url_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_app(dir.path());
    let path = path.to_str().unwrap();
    run(&["url", "message", "id=3", "--app", path]).await.unwrap();

    let err = run(&["url", "nope", "--app", path]).await.unwrap_err();
    assert!(matches!(err, PylonsError::NotFound(_)));

    let err = run(&["url", "message", "--app", path]).await.unwrap_err();
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn test_unknown_command() {
    let err = run(&["migrate"]).await.unwrap_err();
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn test_missing_app_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = run(&["routes", "--app", path.to_str().unwrap()]).await.unwrap_err();
    assert!(matches!(err, PylonsError::IoError(_)));
}
