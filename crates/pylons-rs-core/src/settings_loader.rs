//! Settings loading from configuration files and the environment.
//!
//! Files are parsed with `toml` or `serde_json` and flattened into the dotted
//! keys of a [`Settings`] mapping, so a TOML file like
//!
//! ```toml
//! debug = true
//!
//! [cache]
//! regions = "default_term, short_term"
//! lock_dir = "/tmp/cache"
//!
//! [cache.short_term]
//! expire = 60
//! ```
//!
//! yields `debug`, `cache.regions`, `cache.lock_dir` and `cache.short_term.expire`.
//!
//! ## Loading Order
//!
//! 1. Load from a TOML or JSON file.
//! 2. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! Variables named `PYLONS_<KEY>` override setting `<key>`: the remainder is
//! lower-cased and every `__` becomes a `.`.
//!
//! | Env Var | Setting |
//! |---|---|
//! | `PYLONS_DEBUG` | `debug` |
//! | `PYLONS_LOG_LEVEL` | `log_level` |
//! | `PYLONS_CACHE__REGIONS` | `cache.regions` |
//! | `PYLONS_CACHE__SHORT_TERM__EXPIRE` | `cache.short_term.expire` |

use std::path::Path;

use crate::error::PylonsError;
use crate::settings::Settings;

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "PYLONS_";

/// Loads settings from a TOML string.
///
/// # Errors
///
/// Returns a configuration error if the TOML is malformed.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, PylonsError> {
    let table: toml::Table = toml::from_str(toml_str)
        .map_err(|e| PylonsError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    let json_value = toml_to_json(toml::Value::Table(table));
    from_json_value(json_value)
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, PylonsError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, PylonsError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string. The top level must be an object.
///
/// # Errors
///
/// Returns a configuration error if the JSON is malformed or not an object.
pub fn from_json_str(json_str: &str) -> Result<Settings, PylonsError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| PylonsError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    from_json_value(json_value)
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, PylonsError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, PylonsError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a file, choosing the format from its extension
/// (`.json` is JSON, anything else is TOML), then applies environment overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, PylonsError> {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        from_json_file_with_env(path)
    } else {
        from_toml_file_with_env(path)
    }
}

/// Loads settings from just environment variables.
pub fn from_env() -> Settings {
    let mut settings = Settings::new();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `PYLONS_*` environment variable overrides to a settings mapping.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, std::env::vars());
}

/// Applies `PYLONS_*` overrides from an explicit list of variables.
///
/// Variables without the prefix are ignored.
pub fn apply_overrides_from<I, K, V>(settings: &mut Settings, vars: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    for (name, value) in vars {
        if let Some(key) = env_key_to_setting(name.as_ref()) {
            settings.set(key, value);
        }
    }
}

/// Maps an environment variable name to a setting key, if it carries the prefix.
fn env_key_to_setting(name: &str) -> Option<String> {
    let rest = name.strip_prefix(ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_ascii_lowercase().replace("__", "."))
}

// ============================================================
// Helpers
// ============================================================

fn read_file(path: &Path, format: &str) -> Result<String, PylonsError> {
    std::fs::read_to_string(path).map_err(|e| {
        PylonsError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn from_json_value(value: serde_json::Value) -> Result<Settings, PylonsError> {
    let serde_json::Value::Object(map) = value else {
        return Err(PylonsError::ConfigurationError(
            "Settings must be a table of key/value pairs".to_string(),
        ));
    };
    let mut settings = Settings::new();
    for (key, value) in map {
        flatten_into(&mut settings, &key, value);
    }
    Ok(settings)
}

/// Flattens nested objects into dotted keys; scalars are rendered as strings
/// and arrays are joined with `", "`.
fn flatten_into(settings: &mut Settings, key: &str, value: serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (child, child_value) in map {
                flatten_into(settings, &format!("{key}.{child}"), child_value);
            }
        }
        serde_json::Value::Array(items) => {
            let joined = items
                .into_iter()
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(", ");
            settings.set(key, joined);
        }
        serde_json::Value::Null => {}
        scalar => settings.set(key, scalar_to_string(scalar)),
    }
}

fn scalar_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_flattens_tables() {
        let toml = r#"
            debug = true

            [cache]
            regions = "default_term, short_term"
            lock_dir = "foo"

            [cache.short_term]
            expire = 60
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(settings.debug());
        assert_eq!(settings.get("cache.regions"), Some("default_term, short_term"));
        assert_eq!(settings.get("cache.lock_dir"), Some("foo"));
        assert_eq!(settings.get("cache.short_term.expire"), Some("60"));
    }

    #[test]
    fn test_from_toml_str_dotted_keys() {
        let settings = from_toml_str(r#""cache.default_term.type" = "file""#).unwrap();
        assert_eq!(settings.get("cache.default_term.type"), Some("file"));
    }

    #[test]
    fn test_from_toml_str_array_joined() {
        let settings = from_toml_str(r#"cache = { regions = ["a", "b"] }"#).unwrap();
        assert_eq!(settings.get("cache.regions"), Some("a, b"));
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.is_empty());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = from_toml_str("[[invalid toml content").unwrap_err();
        assert!(err.is_configuration_error());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "log_level": "debug",
            "cache": {"regions": "default_term", "default_term": {"expire": 300}},
            "ignored": null
        }"#;

        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.log_level(), "debug");
        assert_eq!(settings.get("cache.regions"), Some("default_term"));
        assert_eq!(settings.get("cache.default_term.expire"), Some("300"));
        assert!(!settings.contains_key("ignored"));
    }

    #[test]
    fn test_from_json_str_not_an_object() {
        assert!(from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{invalid json").is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("pylons_rs_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.toml");
        std::fs::write(&path, "[cache]\nregions = \"short_term\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.get("cache.regions"), Some("short_term"));

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_json_file_by_extension() {
        let dir = std::env::temp_dir().join("pylons_rs_test_json");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.json");
        std::fs::write(&path, r#"{"debug": "false"}"#).unwrap();

        let settings = from_file_with_env(&path).unwrap();
        assert!(!settings.debug());

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/path/settings.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_from_json_file_missing() {
        assert!(from_json_file("/nonexistent/path/settings.json").is_err());
    }

    // ── Environment variable overrides ──────────────────────────────

    #[test]
    fn test_apply_overrides_from() {
        let mut settings: Settings = [("debug", "true")].into_iter().collect();
        apply_overrides_from(
            &mut settings,
            [
                ("PYLONS_DEBUG", "false"),
                ("PYLONS_CACHE__SHORT_TERM__EXPIRE", "30"),
                ("HOME", "/root"),
                ("PYLONS_", "ignored"),
            ],
        );
        assert!(!settings.debug());
        assert_eq!(settings.get("cache.short_term.expire"), Some("30"));
        assert!(!settings.contains_key("home"));
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn test_env_key_to_setting() {
        assert_eq!(env_key_to_setting("PYLONS_LOG_LEVEL").as_deref(), Some("log_level"));
        assert_eq!(
            env_key_to_setting("PYLONS_CACHE__REGIONS").as_deref(),
            Some("cache.regions")
        );
        assert_eq!(env_key_to_setting("OTHER_DEBUG"), None);
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            flag = true
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["flag"], true);
        assert_eq!(json["nested"]["key"], "value");
    }
}
