//! Handler specifications.
//!
//! A handler is a named set of actions. Each action may carry a callable
//! and may be explicitly exposed with one or more [`ExposeOptions`]; actions
//! without an explicit exposure are candidates for auto-exposure when a
//! route pattern has an `action` placeholder.
//!
//! Handlers are described with a [`HandlerSpec`] built in code, or loaded
//! from a declarative [`HandlerManifest`] (JSON or TOML). A manifest carries
//! no callables, so its actions register views but dispatch to 404.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pylons_rs_core::{PylonsError, PylonsResult};
use pylons_rs_http::{HttpRequest, HttpResponse, SharedPredicate};

/// The attribute name of a handler's default entry point.
pub const DEFAULT_ENTRY_POINT: &str = "__call__";

/// The auto-expose pattern handlers get unless they override it.
pub const DEFAULT_AUTOEXPOSE: &str = "[A-Za-z]+";

/// A handler action.
pub type ActionFn = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

/// One exposure declaration of an action.
///
/// `name` overrides the action name matched against the request's `action`
/// value (it may be a regex). Custom predicates come before the action
/// predicate on the resulting view, and every other option passes through
/// verbatim to the view registration.
#[derive(Clone, Default)]
pub struct ExposeOptions {
    name: Option<String>,
    custom_predicates: Vec<SharedPredicate>,
    options: Map<String, Value>,
}

impl ExposeOptions {
    /// Creates an empty exposure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the action name (or regex) this exposure answers to.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a custom predicate.
    #[must_use]
    pub fn custom_predicate(mut self, predicate: SharedPredicate) -> Self {
        self.custom_predicates.push(predicate);
        self
    }

    /// Adds a passthrough view option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Returns the declared action name, if any.
    pub fn action_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the custom predicates.
    pub fn custom_predicates(&self) -> &[SharedPredicate] {
        &self.custom_predicates
    }

    /// Returns the passthrough options.
    pub const fn options(&self) -> &Map<String, Value> {
        &self.options
    }
}

impl fmt::Debug for ExposeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposeOptions")
            .field("name", &self.name)
            .field("custom_predicates", &self.custom_predicates)
            .field("options", &self.options)
            .finish()
    }
}

impl PartialEq for ExposeOptions {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.options == other.options
            && self.custom_predicates.len() == other.custom_predicates.len()
            && self
                .custom_predicates
                .iter()
                .zip(&other.custom_predicates)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

/// A named action of a handler.
#[derive(Clone, Default)]
pub struct HandlerAction {
    name: String,
    callable: Option<Arc<ActionFn>>,
    exposed: Option<Vec<ExposeOptions>>,
}

impl HandlerAction {
    /// Returns the action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this is the default entry point.
    pub fn is_entry_point(&self) -> bool {
        self.name == DEFAULT_ENTRY_POINT
    }

    /// Returns `true` if the name marks the action private (leading `_`).
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }

    /// Returns the explicit exposure declarations, if the action has any.
    pub fn exposures(&self) -> Option<&[ExposeOptions]> {
        self.exposed.as_deref()
    }

    /// Returns `true` if the action has a callable.
    pub fn is_callable(&self) -> bool {
        self.callable.is_some()
    }

    /// Calls the action, if it has a callable.
    pub fn call(&self, request: &HttpRequest) -> Option<HttpResponse> {
        self.callable.as_ref().map(|f| f(request))
    }
}

impl fmt::Debug for HandlerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerAction")
            .field("name", &self.name)
            .field("callable", &self.callable.is_some())
            .field("exposed", &self.exposed)
            .finish()
    }
}

/// How a handler exposes actions that carry no explicit exposure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoExpose {
    /// Nothing is exposed implicitly.
    Disabled,
    /// Public actions whose names match this regex at the start are exposed.
    Pattern(String),
    /// An undecoded declaration, as read from a manifest. Strings are
    /// patterns, `null` disables auto-exposure, anything else is invalid.
    Declared(Value),
}

impl Default for AutoExpose {
    fn default() -> Self {
        Self::Pattern(DEFAULT_AUTOEXPOSE.to_string())
    }
}

impl AutoExpose {
    /// Compiles the auto-expose pattern, anchored at the start of the name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the declaration is not a string or
    /// `null`, or if the pattern is not a valid regex.
    pub fn compile(&self) -> PylonsResult<Option<Regex>> {
        let source = match self {
            Self::Disabled | Self::Declared(Value::Null) => return Ok(None),
            Self::Pattern(source) => source.as_str(),
            Self::Declared(Value::String(source)) => source.as_str(),
            Self::Declared(other) => {
                return Err(PylonsError::ConfigurationError(format!(
                    "The auto-expose pattern must be a string, got {other}"
                )))
            }
        };
        let invalid = |e: regex::Error| {
            PylonsError::ConfigurationError(format!(
                "The auto-expose pattern '{source}' is not a valid regular expression: {e}"
            ))
        };
        Regex::new(source).map_err(invalid)?;
        Regex::new(&format!("^(?:{source})")).map(Some).map_err(invalid)
    }
}

/// A handler: a name, its actions (kept in name order), and an auto-expose rule.
///
/// # Examples
///
/// ```
/// use pylons_rs_config::{ExposeOptions, HandlerSpec};
/// use pylons_rs_http::HttpResponse;
///
/// let handler = HandlerSpec::new("MessageHandler")
///     .action("index", |_| HttpResponse::ok("all messages"))
///     .expose("index", ExposeOptions::new().name("list"));
///
/// assert!(handler.get_action("index").is_some());
/// assert_eq!(handler.actions().count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct HandlerSpec {
    name: String,
    actions: BTreeMap<String, HandlerAction>,
    autoexpose: AutoExpose,
}

impl HandlerSpec {
    /// Creates a handler with no actions and the default auto-expose pattern.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn action_mut(&mut self, name: &str) -> &mut HandlerAction {
        self.actions
            .entry(name.to_string())
            .or_insert_with(|| HandlerAction {
                name: name.to_string(),
                ..HandlerAction::default()
            })
    }

    /// Adds (or replaces the callable of) an action.
    #[must_use]
    pub fn action<F>(mut self, name: &str, callable: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.action_mut(name).callable = Some(Arc::new(callable));
        self
    }

    /// Sets the default entry point.
    #[must_use]
    pub fn entry_point<F>(self, callable: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.action(DEFAULT_ENTRY_POINT, callable)
    }

    /// Appends an exposure declaration to an action, creating it if needed.
    #[must_use]
    pub fn expose(mut self, name: &str, options: ExposeOptions) -> Self {
        self.action_mut(name)
            .exposed
            .get_or_insert_with(Vec::new)
            .push(options);
        self
    }

    /// Sets the auto-expose rule.
    #[must_use]
    pub fn autoexpose(mut self, autoexpose: AutoExpose) -> Self {
        self.autoexpose = autoexpose;
        self
    }

    /// Returns the handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the auto-expose rule.
    pub const fn autoexpose_rule(&self) -> &AutoExpose {
        &self.autoexpose
    }

    /// Iterates over the actions in name order.
    pub fn actions(&self) -> impl Iterator<Item = &HandlerAction> {
        self.actions.values()
    }

    /// Looks up an action by name.
    pub fn get_action(&self, name: &str) -> Option<&HandlerAction> {
        self.actions.get(name)
    }

    /// Returns the default entry point, if declared.
    pub fn get_entry_point(&self) -> Option<&HandlerAction> {
        self.actions.get(DEFAULT_ENTRY_POINT)
    }

    /// Calls an action (`None` meaning the default entry point).
    ///
    /// Returns `None` when the action does not exist or has no callable.
    pub fn call(&self, attr: Option<&str>, request: &HttpRequest) -> Option<HttpResponse> {
        self.actions
            .get(attr.unwrap_or(DEFAULT_ENTRY_POINT))
            .and_then(|action| action.call(request))
    }
}

impl fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("name", &self.name)
            .field("actions", &self.actions.values().collect::<Vec<_>>())
            .field("autoexpose", &self.autoexpose)
            .finish()
    }
}

// ── Declarative manifests ───────────────────────────────────────────────

fn default_autoexpose_value() -> Value {
    Value::String(DEFAULT_AUTOEXPOSE.to_string())
}

/// One exposure declaration in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposeManifest {
    /// The action name (or regex) this exposure answers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Passthrough view options.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// One action in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionManifest {
    /// Explicit exposure declarations. Absent means "not explicitly exposed".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose: Option<Vec<ExposeManifest>>,
}

/// A declarative handler description.
///
/// ```
/// use pylons_rs_config::HandlerManifest;
///
/// let manifest = HandlerManifest::from_toml_str(r#"
///     name = "messages"
///     autoexpose = "[a-z]+"
///
///     [actions.index]
///     [actions.create]
///     expose = [{ name = "new", renderer = "form.mak" }]
/// "#).unwrap();
///
/// let handler = manifest.into_spec();
/// assert_eq!(handler.actions().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerManifest {
    /// The handler name.
    pub name: String,
    /// The auto-expose declaration (`null` disables it).
    #[serde(default = "default_autoexpose_value")]
    pub autoexpose: Value,
    /// Actions by name.
    #[serde(default)]
    pub actions: BTreeMap<String, ActionManifest>,
}

impl HandlerManifest {
    /// Parses a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> PylonsResult<Self> {
        serde_json::from_str(json).map_err(|e| PylonsError::SerializationError(e.to_string()))
    }

    /// Parses a manifest from TOML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the TOML is malformed.
    pub fn from_toml_str(toml_str: &str) -> PylonsResult<Self> {
        toml::from_str(toml_str).map_err(|e| PylonsError::SerializationError(e.to_string()))
    }

    /// Converts the manifest into a callable-less [`HandlerSpec`].
    pub fn into_spec(self) -> HandlerSpec {
        let mut spec = HandlerSpec::new(self.name).autoexpose(AutoExpose::Declared(self.autoexpose));
        for (name, action) in self.actions {
            spec.action_mut(&name);
            for expose in action.expose.into_iter().flatten() {
                let mut options = ExposeOptions::new();
                options.name = expose.name;
                options.options = expose.options;
                spec = spec.expose(&name, options);
            }
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use pylons_rs_http::urls::predicates::predicate_fn;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_actions_in_name_order() {
        let handler = HandlerSpec::new("h")
            .action("index", |_| HttpResponse::ok("index"))
            .action("create", |_| HttpResponse::ok("create"));
        let names: Vec<&str> = handler.actions().map(HandlerAction::name).collect();
        assert_eq!(names, vec!["create", "index"]);
    }

    #[test]
    fn test_call_action_and_entry_point() {
        let handler = HandlerSpec::new("h")
            .action("index", |_| HttpResponse::ok("index"))
            .entry_point(|_| HttpResponse::ok("default"));
        let request = HttpRequest::builder().build();
        assert_eq!(handler.call(Some("index"), &request).unwrap().body(), "index");
        assert_eq!(handler.call(None, &request).unwrap().body(), "default");
        assert!(handler.call(Some("missing"), &request).is_none());
        assert!(handler.get_entry_point().unwrap().is_entry_point());
    }

    #[test]
    fn test_expose_without_callable() {
        let handler = HandlerSpec::new("h").expose("index", ExposeOptions::new());
        let action = handler.get_action("index").unwrap();
        assert!(!action.is_callable());
        assert_eq!(action.exposures().unwrap().len(), 1);
    }

    #[test]
    fn test_private_action() {
        let handler = HandlerSpec::new("h").action("_secret", |_| HttpResponse::ok(""));
        assert!(handler.get_action("_secret").unwrap().is_private());
    }

    #[test]
    fn test_autoexpose_default_compiles() {
        let regex = AutoExpose::default().compile().unwrap().unwrap();
        assert!(regex.is_match("index"));
        assert!(!regex.is_match("_private"));
    }

    #[test]
    fn test_autoexpose_anchored_at_start() {
        let regex = AutoExpose::Pattern("do".into()).compile().unwrap().unwrap();
        assert!(regex.is_match("do_this"));
        assert!(!regex.is_match("undo"));
    }

    #[test]
    fn test_autoexpose_disabled() {
        assert!(AutoExpose::Disabled.compile().unwrap().is_none());
        assert!(AutoExpose::Declared(Value::Null).compile().unwrap().is_none());
    }

    #[test]
    fn test_autoexpose_invalid() {
        assert!(AutoExpose::Declared(json!(1)).compile().is_err());
        assert!(AutoExpose::Pattern("a\\".into()).compile().is_err());
        assert!(AutoExpose::Declared(json!("a\\")).compile().is_err());
    }

    #[test]
    fn test_expose_options_equality() {
        let pred = predicate_fn("p", |_, _| true);
        let a = ExposeOptions::new().name("x").custom_predicate(pred.clone());
        let b = ExposeOptions::new().name("x").custom_predicate(pred);
        let c = ExposeOptions::new()
            .name("x")
            .custom_predicate(predicate_fn("p", |_, _| true));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.action_name(), Some("x"));
        assert_eq!(a.custom_predicates().len(), 1);
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest = HandlerManifest::from_json_str(
            r#"{
                "name": "pages",
                "autoexpose": null,
                "actions": {
                    "view": {"expose": [{"name": "show", "renderer": "page.mak"}]},
                    "helper": {}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.autoexpose, Value::Null);

        let spec = manifest.into_spec();
        assert_eq!(spec.name(), "pages");
        assert_eq!(spec.autoexpose_rule(), &AutoExpose::Declared(Value::Null));
        let view = spec.get_action("view").unwrap();
        let exposure = &view.exposures().unwrap()[0];
        assert_eq!(exposure.action_name(), Some("show"));
        assert_eq!(exposure.options().get("renderer"), Some(&json!("page.mak")));
        assert!(spec.get_action("helper").unwrap().exposures().is_none());
    }

    #[test]
    fn test_manifest_default_autoexpose() {
        let manifest = HandlerManifest::from_json_str(r#"{"name": "h"}"#).unwrap();
        assert_eq!(manifest.autoexpose, json!(DEFAULT_AUTOEXPOSE));
    }

    #[test]
    fn test_manifest_from_toml() {
        let manifest = HandlerManifest::from_toml_str(
            r#"
            name = "messages"
            autoexpose = 1

            [actions.index]
            "#,
        )
        .unwrap();
        assert!(manifest.into_spec().autoexpose_rule().compile().is_err());
    }

    #[test]
    fn test_manifest_malformed() {
        assert!(HandlerManifest::from_json_str("{").is_err());
        assert!(HandlerManifest::from_toml_str("name = ").is_err());
    }
}
