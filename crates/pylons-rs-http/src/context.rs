//! Per-request attribute bags.
//!
//! [`ContextObj`] is the template context object (`tmpl_context`) handlers
//! fill in for their templates; [`Session`] holds the request's session data
//! when a session layer attached one. Both are [`AttributeBag`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A name-ordered bag of JSON attributes.
///
/// ```
/// use pylons_rs_http::ContextObj;
///
/// let mut c = ContextObj::new();
/// c.set("title", "Messages");
/// assert_eq!(c.get("title"), Some(&serde_json::json!("Messages")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag {
    attrs: BTreeMap<String, Value>,
}

/// The template context object shared between a handler and its templates.
pub type ContextObj = AttributeBag;

/// Session data attached to a request.
pub type Session = AttributeBag;

impl AttributeBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an attribute, if set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Sets an attribute, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attrs.insert(name.into(), value.into())
    }

    /// Removes an attribute.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attrs.remove(name)
    }

    /// Returns `true` if the attribute is set.
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Returns `true` if no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterates over the attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut c = ContextObj::new();
        assert!(c.is_empty());
        assert!(c.set("count", 3).is_none());
        assert_eq!(c.set("count", 4), Some(Value::from(3)));
        assert!(c.contains("count"));
        assert_eq!(c.remove("count"), Some(Value::from(4)));
        assert!(c.is_empty());
    }

    #[test]
    fn test_equality() {
        let mut a = Session::new();
        a.set("user", "alice");
        let mut b = Session::new();
        b.set("user", "alice");
        assert_eq!(a, b);
        b.set("user", "bob");
        assert_ne!(a, b);
    }

    #[test]
    fn test_iter_order() {
        let mut c = ContextObj::new();
        c.set("b", 2);
        c.set("a", 1);
        let names: Vec<&str> = c.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
