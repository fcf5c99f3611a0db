//! View registrations.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use pylons_rs_http::{HttpRequest, HttpResponse, PredicateContext, SharedPredicate};

use crate::handler::HandlerSpec;

/// A view bound to a route: which handler action answers requests for it.
///
/// `attr` is `None` for the handler's default entry point. Registrations
/// are write-once; the configurator builds them from copies of a handler's
/// exposure declarations.
#[derive(Clone)]
pub struct ViewRegistration {
    /// The handler the view calls into.
    pub view: Arc<HandlerSpec>,
    /// The action name, or `None` for the default entry point.
    pub attr: Option<String>,
    /// The route this view answers for.
    pub route_name: String,
    /// Predicates evaluated after the route has matched.
    pub custom_predicates: Vec<SharedPredicate>,
    /// Passthrough options (renderer, permission, ...).
    pub options: Map<String, Value>,
}

impl ViewRegistration {
    /// Returns a passthrough option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Returns `true` if every predicate passes.
    pub fn matches(&self, context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        self.custom_predicates
            .iter()
            .all(|p| p.matches(context, request))
    }

    /// Calls the view's action. `None` if the action has no callable.
    pub fn call(&self, request: &HttpRequest) -> Option<HttpResponse> {
        self.view.call(self.attr.as_deref(), request)
    }
}

impl fmt::Debug for ViewRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistration")
            .field("view", &self.view.name())
            .field("attr", &self.attr)
            .field("route_name", &self.route_name)
            .field("custom_predicates", &self.custom_predicates)
            .field("options", &self.options)
            .finish()
    }
}
