//! Settings mapping for the pylons-rs framework.
//!
//! Application settings are a flat mapping of dotted string keys to string
//! values (`cache.regions`, `cache.short_term.expire`, `debug`, ...), the same
//! shape as a paste-style `[app:main]` section. Typed accessors are provided
//! for the handful of keys the framework itself reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The default log level used when `log_level` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// A flat, ordered mapping of setting names to string values.
///
/// # Examples
///
/// ```
/// use pylons_rs_core::settings::Settings;
///
/// let mut settings = Settings::new();
/// settings.set("cache.regions", "default_term, short_term");
/// assert_eq!(settings.get("cache.regions"), Some("default_term, short_term"));
/// assert!(!settings.debug());
/// assert_eq!(settings.log_level(), "info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Creates an empty settings mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a setting, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value of a setting, treating empty or whitespace-only values as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Sets a setting, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes a setting, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Returns `true` if the setting is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of settings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no settings are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all settings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over the settings under `prefix`, yielding the key with the prefix stripped.
    ///
    /// ```
    /// use pylons_rs_core::settings::Settings;
    ///
    /// let settings: Settings = [("cache.type", "file"), ("debug", "true")].into_iter().collect();
    /// let cache: Vec<_> = settings.with_prefix("cache.").collect();
    /// assert_eq!(cache, vec![("type", "file")]);
    /// ```
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.iter()
            .filter_map(move |(k, v)| k.strip_prefix(prefix).map(|rest| (rest, v)))
    }

    /// Merges `other` into this mapping; values in `other` win.
    pub fn extend(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Whether debug mode is enabled (`debug` is `true`, `1`, `yes` or `on`).
    pub fn debug(&self) -> bool {
        self.get("debug").is_some_and(as_bool)
    }

    /// The configured log filter, defaulting to [`DEFAULT_LOG_LEVEL`].
    pub fn log_level(&self) -> &str {
        self.get_non_empty("log_level").unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Interprets a setting value as a boolean flag.
pub fn as_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
