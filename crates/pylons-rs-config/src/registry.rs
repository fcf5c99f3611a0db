//! The configuration registry.
//!
//! A [`Registry`] holds everything a configurator registers: settings, the
//! routes mapper, view registrations, cache regions and helpers. It is shared
//! as an `Arc<Registry>` between the configurator and the applications it
//! makes.
//!
//! While a configurator is active (between `begin()` and `end()`), its
//! registry sits on a thread-local stack and [`get_current_registry`] returns
//! it. With nothing pushed, a process-wide default registry is returned.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use pylons_rs_core::Settings;
use pylons_rs_http::{Route, RoutesMapper};

use crate::cache::CacheRegion;
use crate::globals::Helpers;
use crate::views::ViewRegistration;

static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::default()));

thread_local! {
    /// Registries of the active configurators, innermost last.
    static REGISTRY_STACK: RefCell<Vec<Arc<Registry>>> = const { RefCell::new(Vec::new()) };
}

/// Everything registered by a configurator.
#[derive(Debug, Default)]
pub struct Registry {
    settings: RwLock<Settings>,
    mapper: RwLock<RoutesMapper>,
    views: RwLock<Vec<ViewRegistration>>,
    cache_regions: RwLock<BTreeMap<String, CacheRegion>>,
    helpers: RwLock<Option<Arc<Helpers>>>,
}

impl Registry {
    /// Creates a registry with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            ..Self::default()
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Returns a snapshot of the settings.
    pub fn settings(&self) -> Settings {
        self.settings.read().expect("settings lock poisoned").clone()
    }

    /// Sets a single setting.
    pub fn set_setting(&self, key: impl Into<String>, value: impl Into<String>) {
        self.settings
            .write()
            .expect("settings lock poisoned")
            .set(key, value);
    }

    /// Merges settings into the registry's settings.
    pub fn update_settings(&self, settings: Settings) {
        self.settings
            .write()
            .expect("settings lock poisoned")
            .extend(settings);
    }

    // ── Routes ───────────────────────────────────────────────────────

    /// Connects a route to the routes mapper.
    pub fn connect_route(&self, route: Route) -> Arc<Route> {
        self.mapper
            .write()
            .expect("routes mapper lock poisoned")
            .connect(route)
    }

    /// Returns a snapshot of the routes mapper.
    pub fn routes_mapper(&self) -> RoutesMapper {
        self.mapper
            .read()
            .expect("routes mapper lock poisoned")
            .clone()
    }

    /// Returns every route in registration order.
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.mapper
            .read()
            .expect("routes mapper lock poisoned")
            .get_routes()
            .to_vec()
    }

    /// Returns the most recently registered route with this name.
    pub fn get_route(&self, name: &str) -> Option<Arc<Route>> {
        self.mapper
            .read()
            .expect("routes mapper lock poisoned")
            .get_route(name)
            .cloned()
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Records a view registration.
    pub fn add_view(&self, view: ViewRegistration) {
        self.views.write().expect("views lock poisoned").push(view);
    }

    /// Returns every view registration in registration order.
    pub fn views(&self) -> Vec<ViewRegistration> {
        self.views.read().expect("views lock poisoned").clone()
    }

    /// Returns the views registered for a route, in registration order.
    pub fn views_for_route(&self, route_name: &str) -> Vec<ViewRegistration> {
        self.views
            .read()
            .expect("views lock poisoned")
            .iter()
            .filter(|v| v.route_name == route_name)
            .cloned()
            .collect()
    }

    // ── Cache regions ────────────────────────────────────────────────

    /// Inserts (or replaces) cache regions.
    pub fn update_cache_regions(&self, regions: BTreeMap<String, CacheRegion>) {
        self.cache_regions
            .write()
            .expect("cache regions lock poisoned")
            .extend(regions);
    }

    /// Returns a snapshot of the cache-region table.
    pub fn cache_regions(&self) -> BTreeMap<String, CacheRegion> {
        self.cache_regions
            .read()
            .expect("cache regions lock poisoned")
            .clone()
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Stores the helpers object.
    pub fn set_helpers(&self, helpers: Arc<Helpers>) {
        *self.helpers.write().expect("helpers lock poisoned") = Some(helpers);
    }

    /// Returns the helpers object, if one was registered.
    pub fn helpers(&self) -> Option<Arc<Helpers>> {
        self.helpers.read().expect("helpers lock poisoned").clone()
    }
}

/// Pushes a registry onto this thread's stack.
pub(crate) fn push_registry(registry: Arc<Registry>) {
    REGISTRY_STACK.with(|stack| stack.borrow_mut().push(registry));
}

/// Pops the innermost registry off this thread's stack.
pub(crate) fn pop_registry() -> Option<Arc<Registry>> {
    REGISTRY_STACK.with(|stack| stack.borrow_mut().pop())
}

/// Returns the registry of the innermost active configurator, or the
/// process-wide default registry.
pub fn get_current_registry() -> Arc<Registry> {
    REGISTRY_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&GLOBAL_REGISTRY))
    })
}

/// Runs a closure with `registry` as the current registry.
///
/// The registry is popped afterwards, even if the closure panics.
pub fn with_registry<F, R>(registry: Arc<Registry>, f: F) -> R
where
    F: FnOnce() -> R,
{
    struct PopGuard;
    impl Drop for PopGuard {
        fn drop(&mut self) {
            pop_registry();
        }
    }

    push_registry(registry);
    let _guard = PopGuard;
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roundtrip() {
        let registry = Registry::new(Settings::new());
        registry.set_setting("cache.regions", "a");
        assert_eq!(registry.settings().get("cache.regions"), Some("a"));

        let extra: Settings = [("debug", "true")].into_iter().collect();
        registry.update_settings(extra);
        assert!(registry.settings().debug());
        assert_eq!(registry.settings().get("cache.regions"), Some("a"));
    }

    #[test]
    fn test_routes() {
        let registry = Registry::default();
        registry.connect_route(Route::new("a", "/one", vec![]).unwrap());
        registry.connect_route(Route::new("a", "/two", vec![]).unwrap());
        assert_eq!(registry.routes().len(), 2);
        assert_eq!(registry.get_route("a").unwrap().path(), "/two");
        assert_eq!(registry.routes_mapper().len(), 2);
    }

    #[test]
    fn test_helpers() {
        let registry = Registry::default();
        assert!(registry.helpers().is_none());
        let helpers = Arc::new(Helpers::new("h"));
        registry.set_helpers(Arc::clone(&helpers));
        assert!(Arc::ptr_eq(&registry.helpers().unwrap(), &helpers));
    }

    #[test]
    fn test_current_registry_stack() {
        let default = get_current_registry();
        let outer = Arc::new(Registry::default());
        let inner = Arc::new(Registry::default());

        with_registry(Arc::clone(&outer), || {
            assert!(Arc::ptr_eq(&get_current_registry(), &outer));
            with_registry(Arc::clone(&inner), || {
                assert!(Arc::ptr_eq(&get_current_registry(), &inner));
            });
            assert!(Arc::ptr_eq(&get_current_registry(), &outer));
        });

        assert!(Arc::ptr_eq(&get_current_registry(), &default));
    }

    #[test]
    fn test_pop_empty_stack() {
        assert!(pop_registry().is_none());
    }
}
