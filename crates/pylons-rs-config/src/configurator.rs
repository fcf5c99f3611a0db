//! The configurator: the registration API applications are built with.
//!
//! A [`Configurator`] writes into a shared [`Registry`]. Handlers are
//! expanded into view registrations in one of three ways, depending on how
//! they are attached to their route:
//!
//! - with an explicit `action`: views for that action only, no action
//!   predicate (the route already decides the action);
//! - with an `action` placeholder in the route path: one view per exposed
//!   action, each guarded by an [`ActionPredicate`];
//! - with neither: views for the handler's default entry point.
//!
//! Expansion works on copies of a handler's exposure declarations, and a
//! failing expansion registers no views.

use std::sync::Arc;

use http::Method;
use serde_json::{Map, Value};

use pylons_rs_core::{PylonsError, PylonsResult, Settings};
use pylons_rs_http::urls::pattern::has_placeholder;
use pylons_rs_http::urls::route::RouteOptions;
use pylons_rs_http::{Route, SharedPredicate};

use crate::app::Application;
use crate::cache::parse_cache_regions;
use crate::globals::Helpers;
use crate::handler::{ExposeOptions, HandlerAction, HandlerSpec};
use crate::predicates::ActionPredicate;
use crate::registry::{pop_registry, push_registry, Registry};
use crate::resolver::{resolve, NameResolver, Resolvable};
use crate::rest::{rest_routes, RestHandlerFactory};
use crate::views::ViewRegistration;

/// The match-dict key handler routes dispatch on.
pub const ACTION_PLACEHOLDER: &str = "action";

/// Options for [`Configurator::add_handler`].
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    action: Option<String>,
    route: RouteOptions,
    view_options: Map<String, Value>,
}

impl HandlerOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the handler for one explicit action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the options of the route created for the handler.
    #[must_use]
    pub fn route_options(mut self, route: RouteOptions) -> Self {
        self.route = route;
        self
    }

    /// Adds a view option, merged into every view after the exposure options.
    #[must_use]
    pub fn view_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.view_options.insert(key.into(), value.into());
        self
    }

    /// Options attaching one action to a route that requires `method`.
    pub fn for_method(action: &str, method: Method) -> Self {
        Self::new()
            .action(action)
            .route_options(RouteOptions::new().request_method(method))
    }

    /// Replaces all view options.
    #[must_use]
    pub fn view_options(mut self, options: Map<String, Value>) -> Self {
        self.view_options = options;
        self
    }
}

/// Registers routes, handlers, helpers and cache regions on a [`Registry`].
///
/// # Examples
///
/// ```
/// use pylons_rs_config::{Configurator, HandlerOptions, HandlerSpec};
/// use pylons_rs_http::HttpResponse;
///
/// let config = Configurator::new();
/// let handler = HandlerSpec::new("Pages")
///     .action("index", |_| HttpResponse::ok("index"))
///     .action("about", |_| HttpResponse::ok("about"));
///
/// config.add_handler("pages", Some("/{action}"), handler, HandlerOptions::new()).unwrap();
///
/// assert_eq!(config.registry().get_route("pages").unwrap().path(), "/:action");
/// assert_eq!(config.registry().views().len(), 2);
/// ```
pub struct Configurator {
    registry: Arc<Registry>,
    resolver: Option<Arc<dyn NameResolver>>,
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Configurator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configurator")
            .field("registry", &self.registry)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Configurator {
    /// Creates a configurator with empty settings and a fresh registry.
    pub fn new() -> Self {
        Self::with_settings(Settings::new())
    }

    /// Creates a configurator with a fresh registry holding `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self::with_registry(Arc::new(Registry::new(settings)))
    }

    /// Creates a configurator writing into an existing registry.
    pub const fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            resolver: None,
        }
    }

    /// Sets the resolver used for dotted names.
    #[must_use]
    pub fn resolver(mut self, resolver: impl NameResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Returns the registry.
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Makes this configurator's registry the current registry of this thread.
    pub fn begin(&self) {
        push_registry(Arc::clone(&self.registry));
    }

    /// Undoes the matching [`begin`](Self::begin).
    pub fn end(&self) {
        pop_registry();
    }

    fn resolve_handler(&self, target: Resolvable<HandlerSpec>) -> PylonsResult<Arc<HandlerSpec>> {
        resolve(target, self.resolver.as_deref(), |r, name| {
            r.resolve_handler(name)
        })
    }

    // ── Routes and views ─────────────────────────────────────────────

    /// Registers a route. `{name}` placeholders are stored as `:name`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the path or a route option regex is invalid.
    pub fn add_route(
        &self,
        name: &str,
        pattern: &str,
        options: RouteOptions,
    ) -> PylonsResult<Arc<Route>> {
        let route = Route::new(name, pattern, options.build_predicates()?)?;
        Ok(self.registry.connect_route(route))
    }

    /// Records a view registration.
    pub fn add_view(&self, view: ViewRegistration) {
        tracing::debug!(
            route = %view.route_name,
            handler = view.view.name(),
            attr = ?view.attr,
            predicates = view.custom_predicates.len(),
            "Registered view"
        );
        self.registry.add_view(view);
    }

    /// Attaches a handler to a route, registering one view per exposed action.
    ///
    /// With `pattern` set to `None`, the most recently registered route named
    /// `route_name` is reused.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    ///
    /// - `pattern` is `None` and no route named `route_name` exists;
    /// - a dotted handler name cannot be resolved;
    /// - an explicit action is given and the path has an `action` placeholder;
    /// - the handler's auto-expose pattern is invalid;
    /// - an exposure's action name is not a valid regex.
    pub fn add_handler(
        &self,
        route_name: &str,
        pattern: Option<&str>,
        handler: impl Into<Resolvable<HandlerSpec>>,
        options: HandlerOptions,
    ) -> PylonsResult<()> {
        let handler = self.resolve_handler(handler.into())?;
        let path = match pattern {
            Some(pattern) => {
                if options.action.is_some() && has_placeholder(pattern, ACTION_PLACEHOLDER) {
                    return Err(action_in_path_error(route_name));
                }
                self.add_route(route_name, pattern, options.route.clone())?
                    .path()
                    .to_string()
            }
            None => self
                .registry
                .get_route(route_name)
                .ok_or_else(|| {
                    PylonsError::ConfigurationError(format!(
                        "No route named '{route_name}' found for handler '{}'",
                        handler.name()
                    ))
                })?
                .path()
                .to_string(),
        };

        let views = expand_handler(route_name, &handler, &path, &options)?;
        for view in views {
            self.add_view(view);
        }
        Ok(())
    }

    /// Registers the seven routes of a REST resource and their views.
    ///
    /// Each route carries a single request-method predicate and is attached
    /// to `handler` with an explicit action. `view_options` are merged into
    /// every view.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a dotted handler name cannot be
    /// resolved or a handler exposure is invalid.
    pub fn add_rest_handler(
        &self,
        plural: &str,
        singular: &str,
        handler: impl Into<Resolvable<HandlerSpec>>,
        view_options: Map<String, Value>,
    ) -> PylonsResult<RestHandlerFactory> {
        let handler = self.resolve_handler(handler.into())?;
        for route in rest_routes(plural, singular) {
            let options = HandlerOptions::for_method(route.action, route.method)
                .view_options(view_options.clone());
            self.add_handler(&route.name, Some(&route.path), Arc::clone(&handler), options)?;
        }
        Ok(RestHandlerFactory::new(handler))
    }

    // ── Helpers and cache ────────────────────────────────────────────

    /// Stores the helpers object templates see as `h`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a dotted name cannot be resolved.
    pub fn add_helpers(&self, helpers: impl Into<Resolvable<Helpers>>) -> PylonsResult<()> {
        let helpers = resolve(helpers.into(), self.resolver.as_deref(), |r, name| {
            r.resolve_helpers(name)
        })?;
        tracing::debug!(helpers = helpers.name(), "Registered helpers");
        self.registry.set_helpers(helpers);
        Ok(())
    }

    /// Builds the cache regions declared in the settings into the registry.
    ///
    /// Does nothing when `cache.regions` is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a region's `expire` is not an unsigned integer.
    pub fn add_cache(&self) -> PylonsResult<()> {
        let regions = parse_cache_regions(&self.registry.settings())?;
        if regions.is_empty() {
            return Ok(());
        }
        for (name, region) in &regions {
            tracing::info!(
                region = %name,
                kind = %region.kind,
                expire = region.expire,
                lock_dir = ?region.lock_dir,
                "Configured cache region"
            );
        }
        self.registry.update_cache_regions(regions);
        Ok(())
    }

    // ── Applications ─────────────────────────────────────────────────

    /// Returns an application dispatching over this configurator's registry.
    pub fn make_app(&self) -> Application {
        Application::new(Arc::clone(&self.registry))
    }
}

fn action_in_path_error(route_name: &str) -> PylonsError {
    PylonsError::ConfigurationError(format!(
        "action= (value) is not allowed when the path of route '{route_name}' contains an action placeholder"
    ))
}

/// Returns the view `attr` for a handler action.
fn attr_of(action: &HandlerAction) -> Option<String> {
    (!action.is_entry_point()).then(|| action.name().to_string())
}

fn make_view(
    route_name: &str,
    handler: &Arc<HandlerSpec>,
    attr: Option<String>,
    custom_predicates: Vec<SharedPredicate>,
    exposure_options: &Map<String, Value>,
    call_site: &Map<String, Value>,
) -> ViewRegistration {
    let mut options = exposure_options.clone();
    options.extend(call_site.iter().map(|(k, v)| (k.clone(), v.clone())));
    ViewRegistration {
        view: Arc::clone(handler),
        attr,
        route_name: route_name.to_string(),
        custom_predicates,
        options,
    }
}

/// Expands a handler into view registrations without touching the registry.
fn expand_handler(
    route_name: &str,
    handler: &Arc<HandlerSpec>,
    path: &str,
    options: &HandlerOptions,
) -> PylonsResult<Vec<ViewRegistration>> {
    let path_has_action = has_placeholder(path, ACTION_PLACEHOLDER);
    match (&options.action, path_has_action) {
        (Some(_), true) => Err(action_in_path_error(route_name)),
        (Some(action), false) => Ok(explicit_action_views(route_name, handler, action, options)),
        (None, true) => placeholder_views(route_name, handler, options),
        (None, false) => Ok(entry_point_views(route_name, handler, options)),
    }
}

/// Views for one explicitly requested action.
///
/// Every exposure whose action name equals `action` yields a view, then the
/// action itself gets a plain view unless one of its own exposures already
/// produced one. The plain view carries only the call-site options: an
/// exposure that renames the action contributes nothing to it.
fn explicit_action_views(
    route_name: &str,
    handler: &Arc<HandlerSpec>,
    action: &str,
    options: &HandlerOptions,
) -> Vec<ViewRegistration> {
    let mut views = Vec::new();
    let mut action_emitted = false;

    for candidate in handler.actions() {
        for expose in candidate.exposures().unwrap_or_default() {
            if expose.action_name().unwrap_or(candidate.name()) != action {
                continue;
            }
            action_emitted |= candidate.name() == action;
            views.push(make_view(
                route_name,
                handler,
                attr_of(candidate),
                expose.custom_predicates().to_vec(),
                expose.options(),
                &options.view_options,
            ));
        }
    }

    if !action_emitted {
        let attr = handler
            .get_action(action)
            .map_or_else(|| Some(action.to_string()), attr_of);
        views.push(make_view(
            route_name,
            handler,
            attr,
            Vec::new(),
            &Map::new(),
            &options.view_options,
        ));
    }
    views
}

/// Views for a route whose path carries an `action` placeholder.
fn placeholder_views(
    route_name: &str,
    handler: &Arc<HandlerSpec>,
    options: &HandlerOptions,
) -> PylonsResult<Vec<ViewRegistration>> {
    let autoexpose = handler.autoexpose_rule().compile()?;
    let mut views = Vec::new();

    for action in handler.actions() {
        let exposures: Vec<ExposeOptions> = match (action.exposures(), &autoexpose) {
            (Some(exposed), _) => exposed.to_vec(),
            (None, Some(pattern)) if !action.is_private() && pattern.is_match(action.name()) => {
                vec![ExposeOptions::new()]
            }
            (None, _) => continue,
        };

        for expose in exposures {
            let action_name = expose.action_name().unwrap_or(action.name());
            let mut predicates = expose.custom_predicates().to_vec();
            predicates.push(Arc::new(ActionPredicate::new(Some(action_name))?));
            views.push(make_view(
                route_name,
                handler,
                attr_of(action),
                predicates,
                expose.options(),
                &options.view_options,
            ));
        }
    }
    Ok(views)
}

/// Views for the default entry point of a handler attached without an action.
fn entry_point_views(
    route_name: &str,
    handler: &Arc<HandlerSpec>,
    options: &HandlerOptions,
) -> Vec<ViewRegistration> {
    let exposures = handler
        .get_entry_point()
        .and_then(HandlerAction::exposures)
        .map_or_else(|| vec![ExposeOptions::new()], <[ExposeOptions]>::to_vec);

    exposures
        .iter()
        .map(|expose| {
            make_view(
                route_name,
                handler,
                None,
                expose.custom_predicates().to_vec(),
                expose.options(),
                &options.view_options,
            )
        })
        .collect()
}
