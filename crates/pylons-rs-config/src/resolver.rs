//! Dotted-name resolution.
//!
//! Registration calls accept either a resolved object or a dotted name
//! (`"myapp.handlers.Messages"`). Names are looked up through a
//! [`NameResolver`] the application supplies to its configurator.

use std::collections::HashMap;
use std::sync::Arc;

use pylons_rs_core::{PylonsError, PylonsResult};

use crate::globals::Helpers;
use crate::handler::HandlerSpec;

/// Looks up handlers and helpers by dotted name.
pub trait NameResolver: Send + Sync {
    /// Resolves a handler.
    fn resolve_handler(&self, name: &str) -> Option<Arc<HandlerSpec>>;

    /// Resolves a helpers object.
    fn resolve_helpers(&self, name: &str) -> Option<Arc<Helpers>>;
}

/// Either an already-resolved object or a dotted name to resolve.
#[derive(Debug, Clone)]
pub enum Resolvable<T> {
    /// The object itself.
    Resolved(Arc<T>),
    /// A dotted name.
    Dotted(String),
}

impl<T> From<Arc<T>> for Resolvable<T> {
    fn from(value: Arc<T>) -> Self {
        Self::Resolved(value)
    }
}

impl<T> From<&str> for Resolvable<T> {
    fn from(name: &str) -> Self {
        Self::Dotted(name.to_string())
    }
}

impl<T> From<String> for Resolvable<T> {
    fn from(name: String) -> Self {
        Self::Dotted(name)
    }
}

impl From<HandlerSpec> for Resolvable<HandlerSpec> {
    fn from(value: HandlerSpec) -> Self {
        Self::Resolved(Arc::new(value))
    }
}

impl From<Helpers> for Resolvable<Helpers> {
    fn from(value: Helpers) -> Self {
        Self::Resolved(Arc::new(value))
    }
}

/// Resolves a target against an optional resolver.
pub(crate) fn resolve<T>(
    target: Resolvable<T>,
    resolver: Option<&dyn NameResolver>,
    lookup: impl Fn(&dyn NameResolver, &str) -> Option<Arc<T>>,
) -> PylonsResult<Arc<T>> {
    match target {
        Resolvable::Resolved(value) => Ok(value),
        Resolvable::Dotted(name) => resolver
            .and_then(|r| lookup(r, &name))
            .ok_or_else(|| {
                PylonsError::ConfigurationError(format!("Could not resolve dotted name '{name}'"))
            }),
    }
}

/// A resolver backed by in-memory tables.
///
/// ```
/// use pylons_rs_config::{HandlerSpec, NameResolver, StaticResolver};
///
/// let resolver = StaticResolver::new().with_handler("app.handlers.Pages", HandlerSpec::new("Pages"));
/// assert!(resolver.resolve_handler("app.handlers.Pages").is_some());
/// assert!(resolver.resolve_handler("app.handlers.Missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    handlers: HashMap<String, Arc<HandlerSpec>>,
    helpers: HashMap<String, Arc<Helpers>>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a dotted name.
    #[must_use]
    pub fn with_handler(mut self, name: &str, handler: impl Into<Arc<HandlerSpec>>) -> Self {
        self.handlers.insert(name.to_string(), handler.into());
        self
    }

    /// Registers a helpers object under a dotted name.
    #[must_use]
    pub fn with_helpers(mut self, name: &str, helpers: impl Into<Arc<Helpers>>) -> Self {
        self.helpers.insert(name.to_string(), helpers.into());
        self
    }
}

impl NameResolver for StaticResolver {
    fn resolve_handler(&self, name: &str) -> Option<Arc<HandlerSpec>> {
        self.handlers.get(name).cloned()
    }

    fn resolve_helpers(&self, name: &str) -> Option<Arc<Helpers>> {
        self.helpers.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_resolved() {
        let handler = Arc::new(HandlerSpec::new("h"));
        let resolved = resolve(Resolvable::from(Arc::clone(&handler)), None, |r, n| {
            r.resolve_handler(n)
        })
        .unwrap();
        assert!(Arc::ptr_eq(&handler, &resolved));
    }

    #[test]
    fn test_resolve_dotted() {
        let handler = Arc::new(HandlerSpec::new("h"));
        let resolver = StaticResolver::new().with_handler("app.H", Arc::clone(&handler));
        let resolved = resolve(Resolvable::from("app.H"), Some(&resolver), |r, n| {
            r.resolve_handler(n)
        })
        .unwrap();
        assert!(Arc::ptr_eq(&handler, &resolved));
    }

    #[test]
    fn test_resolve_dotted_missing() {
        let resolver = StaticResolver::new();
        let err = resolve::<HandlerSpec>(Resolvable::from("app.Missing"), Some(&resolver), |r, n| {
            r.resolve_handler(n)
        })
        .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_resolve_dotted_without_resolver() {
        let err = resolve::<Helpers>(Resolvable::from("app.helpers".to_string()), None, |r, n| {
            r.resolve_helpers(n)
        })
        .unwrap_err();
        assert!(err.is_configuration_error());
    }
}
