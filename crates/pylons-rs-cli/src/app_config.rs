//! Declarative application configuration.
//!
//! An [`AppConfig`] describes an application the way the management
//! commands see it: a settings file, handler manifests, routes, REST
//! resources, helpers, and whether to build cache regions. It is read from
//! TOML or JSON and replayed onto a [`Configurator`].
//!
//! ```toml
//! settings = "settings.toml"
//! cache = true
//!
//! [[handlers]]
//! name = "pages"
//! [handlers.actions.index]
//! [handlers.actions.about]
//!
//! [[routes]]
//! name = "pages"
//! pattern = "/pages/{action}"
//! handler = "pages"
//! request_method = "GET"
//!
//! [[rest]]
//! plural = "messages"
//! singular = "message"
//! handler = "pages"
//! ```
//!
//! Handlers declared here have no callables; the configuration they build is
//! complete for inspection but dispatches every matched view to a 404.

use std::path::{Path, PathBuf};

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pylons_rs_config::{Configurator, HandlerManifest, HandlerOptions, Helpers, StaticResolver};
use pylons_rs_core::{settings_loader, PylonsError, PylonsResult, Settings};
use pylons_rs_http::urls::route::RouteOptions;

/// The application description read by the management commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Settings file (TOML or JSON), relative to the config file.
    pub settings: Option<PathBuf>,
    /// Build cache regions from the `cache.*` settings.
    pub cache: bool,
    /// Helpers exposed to templates as `h`.
    pub helpers: Option<Helpers>,
    /// Handler manifests, resolvable by name from routes and REST resources.
    pub handlers: Vec<HandlerManifest>,
    /// Routes, in registration order.
    pub routes: Vec<RouteConfig>,
    /// REST resources.
    pub rest: Vec<RestConfig>,
}

/// One route, optionally with a handler attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub name: String,
    /// Required unless a route of this name was declared earlier.
    pub pattern: Option<String>,
    /// Name of a handler manifest to attach.
    pub handler: Option<String>,
    /// Explicit action for the handler.
    pub action: Option<String>,
    pub xhr: Option<bool>,
    pub request_method: Option<String>,
    pub path_info: Option<String>,
    pub request_param: Option<String>,
    pub header: Option<String>,
    pub accept: Option<String>,
    /// Passthrough options merged into every view of the handler.
    pub view_options: Map<String, Value>,
}

/// One REST resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestConfig {
    pub plural: String,
    pub singular: String,
    pub handler: String,
    #[serde(default)]
    pub view_options: Map<String, Value>,
}

impl AppConfig {
    /// Parses a config from TOML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the TOML is malformed.
    pub fn from_toml_str(toml_str: &str) -> PylonsResult<Self> {
        toml::from_str(toml_str).map_err(|e| PylonsError::SerializationError(e.to_string()))
    }

    /// Parses a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> PylonsResult<Self> {
        serde_json::from_str(json).map_err(|e| PylonsError::SerializationError(e.to_string()))
    }

    /// Reads a config file, choosing the format by extension (`.json` or TOML).
    ///
    /// A relative `settings` path is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a serialization
    /// error if it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> PylonsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        if let (Some(settings), Some(dir)) = (config.settings.as_mut(), path.parent()) {
            if settings.is_relative() {
                *settings = dir.join(&*settings);
            }
        }
        Ok(config)
    }

    /// Loads the settings file with environment overrides, or only the
    /// environment when no file is named.
    ///
    /// # Errors
    ///
    /// Returns [`PylonsError::ImproperlyConfigured`] if the named file does not
    /// exist, or an error if it cannot be read or parsed.
    pub fn load_settings(&self) -> PylonsResult<Settings> {
        let Some(path) = &self.settings else {
            return Ok(settings_loader::from_env());
        };
        if !path.exists() {
            return Err(PylonsError::ImproperlyConfigured(format!(
                "Settings file '{}' does not exist",
                path.display()
            )));
        }
        settings_loader::from_file_with_env(path)
    }

    /// Replays the config onto a fresh configurator holding `settings`.
    ///
    /// Registration happens in this order: helpers, routes, REST resources,
    /// then cache regions.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error raised by a registration.
    pub fn configure(&self, settings: Settings) -> PylonsResult<Configurator> {
        let mut resolver = StaticResolver::new();
        for manifest in &self.handlers {
            resolver = resolver.with_handler(&manifest.name, manifest.clone().into_spec());
        }
        if let Some(helpers) = &self.helpers {
            resolver = resolver.with_helpers(helpers.name(), helpers.clone());
        }
        let config = Configurator::with_settings(settings).resolver(resolver);

        if let Some(helpers) = &self.helpers {
            config.add_helpers(helpers.name())?;
        }
        for route in &self.routes {
            route.register(&config)?;
        }
        for rest in &self.rest {
            config.add_rest_handler(
                &rest.plural,
                &rest.singular,
                rest.handler.as_str(),
                rest.view_options.clone(),
            )?;
        }
        if self.cache {
            config.add_cache()?;
        }
        Ok(config)
    }
}

impl RouteConfig {
    /// Builds the route options this entry declares.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `request_method` is not a valid method.
    pub fn route_options(&self) -> PylonsResult<RouteOptions> {
        let mut options = RouteOptions::new();
        if let Some(xhr) = self.xhr {
            options = options.xhr(xhr);
        }
        if let Some(method) = &self.request_method {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
                PylonsError::configuration(format!(
                    "Invalid request_method '{method}' for route '{}'",
                    self.name
                ))
            })?;
            options = options.request_method(method);
        }
        if let Some(regex) = &self.path_info {
            options = options.path_info(regex.as_str());
        }
        if let Some(spec) = &self.request_param {
            options = options.request_param(spec.as_str());
        }
        if let Some(spec) = &self.header {
            options = options.header(spec.as_str());
        }
        if let Some(media_type) = &self.accept {
            options = options.accept(media_type.as_str());
        }
        Ok(options)
    }

    fn register(&self, config: &Configurator) -> PylonsResult<()> {
        let options = self.route_options()?;
        if let Some(handler) = &self.handler {
            let mut handler_options = HandlerOptions::new()
                .route_options(options)
                .view_options(self.view_options.clone());
            if let Some(action) = &self.action {
                handler_options = handler_options.action(action.as_str());
            }
            return config.add_handler(
                &self.name,
                self.pattern.as_deref(),
                handler.as_str(),
                handler_options,
            );
        }

        let pattern = self.pattern.as_deref().ok_or_else(|| {
            PylonsError::configuration(format!(
                "Route '{}' needs a pattern or a handler",
                self.name
            ))
        })?;
        config.add_route(&self.name, pattern, options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = r#"
        [[handlers]]
        name = "pages"
        [handlers.actions.index]
        [handlers.actions.about]

        [[routes]]
        name = "home"
        pattern = "/"

        [[routes]]
        name = "pages"
        pattern = "/pages/{action}"
        handler = "pages"
        request_method = "get"

        [[rest]]
        plural = "messages"
        singular = "message"
        handler = "pages"
    "#;

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml_str(APP).unwrap();
        assert_eq!(config.handlers.len(), 1);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].handler.as_deref(), Some("pages"));
        assert_eq!(config.rest[0].singular, "message");
        assert!(!config.cache);
    }

    #[test]
    fn test_parse_json() {
        let config = AppConfig::from_json_str(
            r#"{"routes": [{"name": "home", "pattern": "/"}], "cache": true}"#,
        )
        .unwrap();
        assert!(config.cache);
        assert_eq!(config.routes[0].pattern.as_deref(), Some("/"));
    }

    #[test]
    fn test_parse_malformed() {
        let err = AppConfig::from_toml_str("routes = 3").unwrap_err();
        assert!(matches!(err, PylonsError::SerializationError(_)));
    }

    #[test]
    fn test_configure() {
        let config = AppConfig::from_toml_str(APP).unwrap();
        let configurator = config.configure(Settings::new()).unwrap();
        let registry = configurator.registry();

        let names: Vec<String> = registry.routes().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(&names[..2], ["home", "pages"]);
        // Seven REST routes follow the two declared ones.
        assert_eq!(names.len(), 9);
        assert_eq!(registry.views_for_route("pages").len(), 2);
        assert_eq!(
            registry.get_route("pages").unwrap().predicates()[0].text(),
            "request method = GET"
        );
    }

    #[test]
    fn test_route_without_pattern_or_handler() {
        let config = AppConfig::from_toml_str("[[routes]]\nname = \"lost\"").unwrap();
        let err = config.configure(Settings::new()).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("lost"));
    }

    #[test]
    fn test_unknown_handler() {
        let config = AppConfig::from_toml_str(
            "[[routes]]\nname = \"x\"\npattern = \"/x\"\nhandler = \"missing\"",
        )
        .unwrap();
        assert!(config.configure(Settings::new()).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_invalid_request_method() {
        let route = RouteConfig {
            name: "x".to_string(),
            request_method: Some("NOT A METHOD".to_string()),
            ..RouteConfig::default()
        };
        assert!(route.route_options().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_from_file_resolves_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.toml"), "[cache]\nregions = \"short\"\n").unwrap();
        let app_path = dir.path().join("app.toml");
        std::fs::write(&app_path, "settings = \"settings.toml\"\ncache = true\n").unwrap();

        let config = AppConfig::from_file(&app_path).unwrap();
        assert_eq!(config.settings.as_deref(), Some(dir.path().join("settings.toml").as_path()));

        let settings = config.load_settings().unwrap();
        assert_eq!(settings.get("cache.regions"), Some("short"));
        let configurator = config.configure(settings).unwrap();
        assert!(configurator.registry().cache_regions().contains_key("short"));
    }

    #[test]
    fn test_missing_settings_file() {
        let config = AppConfig {
            settings: Some(PathBuf::from("/nonexistent/settings.toml")),
            ..AppConfig::default()
        };
        let err = config.load_settings().unwrap_err();
        assert!(matches!(err, PylonsError::ImproperlyConfigured(_)));
    }
}
