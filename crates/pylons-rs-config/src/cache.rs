//! Cache region configuration.
//!
//! Regions are declared in settings:
//!
//! ```toml
//! [cache]
//! regions = "default_term, short_term"
//! lock_dir = "/tmp/cache"
//! default_term = { type = "file", expire = "300" }
//! ```
//!
//! Each region takes `type`, `expire` and `lock_dir` from its own keys
//! (`cache.<region>.*`), then the global `cache.*` keys, then the defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pylons_rs_core::{PylonsError, PylonsResult, Settings};

/// Backend type used when neither the region nor `cache.type` names one.
pub const DEFAULT_CACHE_TYPE: &str = "memory";

/// Expiry (seconds) used when neither the region nor `cache.expire` sets one.
pub const DEFAULT_CACHE_EXPIRE: u64 = 60;

/// One configured cache region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRegion {
    /// Backend type (`memory`, `file`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Expiry in seconds.
    pub expire: u64,
    /// Lock directory, if any.
    pub lock_dir: Option<String>,
}

/// Returns the region names listed in `cache.regions`.
pub fn region_names(settings: &Settings) -> Vec<String> {
    settings
        .get("cache.regions")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup<'a>(settings: &'a Settings, region: &str, key: &str) -> Option<&'a str> {
    settings
        .get_non_empty(&format!("cache.{region}.{key}"))
        .or_else(|| settings.get_non_empty(&format!("cache.{key}")))
}

/// Builds the cache regions declared in settings.
///
/// # Errors
///
/// Returns a configuration error if an `expire` value is not an unsigned integer.
pub fn parse_cache_regions(settings: &Settings) -> PylonsResult<BTreeMap<String, CacheRegion>> {
    region_names(settings)
        .into_iter()
        .map(|region| {
            let expire = match lookup(settings, &region, "expire") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    PylonsError::ConfigurationError(format!(
                        "Cache region '{region}' has a non-numeric expire: '{raw}'"
                    ))
                })?,
                None => DEFAULT_CACHE_EXPIRE,
            };
            let config = CacheRegion {
                kind: lookup(settings, &region, "type")
                    .unwrap_or(DEFAULT_CACHE_TYPE)
                    .to_string(),
                expire,
                lock_dir: lookup(settings, &region, "lock_dir").map(str::to_string),
            };
            Ok((region, config))
        })
        .collect()
}
