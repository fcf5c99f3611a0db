//! Template helpers and renderer globals.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pylons_rs_http::{ContextObj, HttpRequest, Session};

use crate::registry::get_current_registry;

/// A named bag of helper values exposed to templates as `h`.
///
/// ```
/// use pylons_rs_config::Helpers;
///
/// let h = Helpers::new("myapp.lib.helpers").with("site_name", "Example");
/// assert_eq!(h.get("site_name"), Some(&serde_json::json!("Example")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Helpers {
    name: String,
    #[serde(default)]
    values: BTreeMap<String, Value>,
}

impl Helpers {
    /// Creates an empty helpers object.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Adds a helper value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns the helpers name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a helper value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// The system values a renderer hands to [`globals_factory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RendererSystem<'a> {
    /// The request being rendered for, if any.
    pub request: Option<&'a HttpRequest>,
}

/// The globals injected into every template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RendererGlobals {
    /// The helpers registered on the current registry.
    pub h: Option<Arc<Helpers>>,
    /// The request's template context, when rendering for a request.
    pub tmpl_context: Option<ContextObj>,
    /// The request's session, when it has one.
    pub session: Option<Session>,
}

/// Builds the renderer globals from the current registry and request.
pub fn globals_factory(system: RendererSystem<'_>) -> RendererGlobals {
    let h = get_current_registry().helpers();
    let Some(request) = system.request else {
        return RendererGlobals {
            h,
            ..RendererGlobals::default()
        };
    };
    RendererGlobals {
        h,
        tmpl_context: Some(request.tmpl_context().clone()),
        session: request.session().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_accessors() {
        let h = Helpers::new("h").with("a", 1);
        assert_eq!(h.name(), "h");
        assert_eq!(h.get("a"), Some(&Value::from(1)));
        assert!(h.get("b").is_none());
    }

    #[test]
    fn test_helpers_serde() {
        let h: Helpers = serde_json::from_str(r#"{"name": "h", "values": {"x": true}}"#).unwrap();
        assert_eq!(h.get("x"), Some(&Value::Bool(true)));
    }
}
