//! Controllers and their dispatcher.

use std::fmt;
use std::sync::Arc;

use pylons_rs_config::HandlerSpec;
use pylons_rs_http::{HttpRequest, HttpResponse};

use crate::result::ActionResult;

/// The action dispatched to when the match-dict has no `action`.
pub const DEFAULT_ACTION: &str = "index";

/// A controller action.
pub type Action<C> = fn(&mut C, &HttpRequest) -> ActionResult;

/// A controller: a set of named actions with optional hooks.
///
/// # Examples
///
/// ```
/// use pylons_rs_controllers::{Action, ActionResult, Controller, ControllerApp};
/// use pylons_rs_http::HttpRequest;
///
/// #[derive(Default)]
/// struct Hello;
///
/// impl Hello {
///     fn index(&mut self, _request: &HttpRequest) -> ActionResult {
///         "hello world".into()
///     }
/// }
///
/// impl Controller for Hello {
///     fn action(name: &str) -> Option<Action<Self>> {
///         match name {
///             "index" => Some(Self::index),
///             _ => None,
///         }
///     }
/// }
///
/// let app = ControllerApp::new(Hello::default);
/// let response = app.handle(&HttpRequest::builder().build());
/// assert_eq!(response.body(), "hello world");
/// ```
pub trait Controller: Send + Sized + 'static {
    /// Looks up an action by name.
    fn action(name: &str) -> Option<Action<Self>>;

    /// Runs before the action.
    fn before(&mut self, _request: &HttpRequest) {}

    /// Runs after the action and may modify its response.
    fn after(&mut self, _request: &HttpRequest, _response: &mut HttpResponse) {}
}

/// Dispatches requests to a fresh controller from `factory`.
pub struct ControllerApp<C> {
    factory: Arc<dyn Fn() -> C + Send + Sync>,
}

impl<C> Clone for ControllerApp<C> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<C> fmt::Debug for ControllerApp<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerApp")
            .field("controller", &std::any::type_name::<C>())
            .finish()
    }
}

impl<C: Controller> ControllerApp<C> {
    /// Creates a dispatcher building one controller per request.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Dispatches a request on its `action` match-dict value.
    ///
    /// Private (`_`-prefixed) and unknown actions are a 404. Otherwise the
    /// controller's `before` hook runs, then the action, then `after` with
    /// the converted response.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let name = request.match_value("action").unwrap_or(DEFAULT_ACTION);
        if name.starts_with('_') {
            tracing::warn!(action = name, "Refusing to dispatch to a private action");
            return HttpResponse::not_found("Not Found");
        }
        let Some(action) = C::action(name) else {
            tracing::warn!(
                action = name,
                controller = std::any::type_name::<C>(),
                "Action not found"
            );
            return HttpResponse::not_found("Not Found");
        };

        let mut controller = (self.factory)();
        controller.before(request);
        let mut response = action(&mut controller, request).into_response();
        controller.after(request, &mut response);
        response
    }

    /// Wraps the dispatcher as a handler whose entry point is [`handle`](Self::handle),
    /// so a controller can be attached to routes with a configurator.
    pub fn into_handler(self, name: impl Into<String>) -> HandlerSpec {
        HandlerSpec::new(name).entry_point(move |request| self.handle(request))
    }
}
