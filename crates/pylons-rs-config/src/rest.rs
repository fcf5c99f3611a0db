//! REST resource routing.

use std::sync::Arc;

use http::Method;

use pylons_rs_core::{PylonsError, PylonsResult};
use pylons_rs_http::{HttpRequest, HttpResponse};

use crate::handler::HandlerSpec;

/// One route of a REST resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRoute {
    /// Route name.
    pub name: String,
    /// Route path.
    pub path: String,
    /// The HTTP method the route requires.
    pub method: Method,
    /// The handler action answering the route.
    pub action: &'static str,
}

/// The seven routes of a REST resource, in registration order.
///
/// ```
/// use pylons_rs_config::rest::rest_routes;
///
/// let routes = rest_routes("messages", "message");
/// assert_eq!(routes[3].name, "message");
/// assert_eq!(routes[3].path, "messages/:id");
/// assert_eq!(routes[3].action, "show");
/// ```
pub fn rest_routes(plural: &str, singular: &str) -> Vec<RestRoute> {
    let member = format!("{plural}/:id");
    [
        (plural.to_string(), plural.to_string(), Method::GET, "index"),
        (format!("{plural}_create"), plural.to_string(), Method::POST, "create"),
        (format!("new_{singular}"), format!("{plural}/new"), Method::GET, "new"),
        (singular.to_string(), member.clone(), Method::GET, "show"),
        (format!("{singular}_update"), member.clone(), Method::PUT, "update"),
        (format!("{singular}_delete"), member.clone(), Method::DELETE, "delete"),
        (format!("edit_{singular}"), format!("{member}/edit"), Method::GET, "edit"),
    ]
    .into_iter()
    .map(|(name, path, method, action)| RestRoute {
        name,
        path,
        method,
        action,
    })
    .collect()
}

/// What [`Configurator::add_rest_handler`](crate::Configurator::add_rest_handler) returns.
#[derive(Debug, Clone)]
pub struct RestHandlerFactory {
    factory: Arc<HandlerSpec>,
}

impl RestHandlerFactory {
    pub(crate) const fn new(factory: Arc<HandlerSpec>) -> Self {
        Self { factory }
    }

    /// Returns the resolved handler.
    pub const fn factory(&self) -> &Arc<HandlerSpec> {
        &self.factory
    }

    /// Binds the handler to a request.
    pub fn bind<'a>(&'a self, request: &'a HttpRequest) -> RestHandler<'a> {
        RestHandler {
            handler: &self.factory,
            request,
        }
    }
}

/// A REST handler bound to a request.
///
/// Member actions (`show`, `update`, `delete`, `edit`) require an `id` in
/// the request's match-dict.
#[derive(Debug, Clone, Copy)]
pub struct RestHandler<'a> {
    handler: &'a HandlerSpec,
    request: &'a HttpRequest,
}

impl RestHandler<'_> {
    /// Returns the `id` match-dict value.
    pub fn id(&self) -> Option<&str> {
        self.request.match_value("id")
    }

    fn call(&self, action: &str) -> PylonsResult<HttpResponse> {
        self.handler.call(Some(action), self.request).ok_or_else(|| {
            PylonsError::NotFound(format!(
                "Handler '{}' has no action '{action}'",
                self.handler.name()
            ))
        })
    }

    fn call_member(&self, action: &str) -> PylonsResult<HttpResponse> {
        if self.id().is_none() {
            return Err(PylonsError::NotFound(format!(
                "No id in the match-dict for '{action}'"
            )));
        }
        self.call(action)
    }

    /// Lists the collection.
    pub fn index(&self) -> PylonsResult<HttpResponse> {
        self.call("index")
    }

    /// Creates a member.
    pub fn create(&self) -> PylonsResult<HttpResponse> {
        self.call("create")
    }

    /// Shows the form for a new member.
    #[allow(clippy::new_ret_no_self, clippy::should_implement_trait)]
    pub fn new(&self) -> PylonsResult<HttpResponse> {
        self.call("new")
    }

    /// Shows the member with the request's `id`.
    pub fn show(&self) -> PylonsResult<HttpResponse> {
        self.call_member("show")
    }

    /// Updates the member with the request's `id`.
    pub fn update(&self) -> PylonsResult<HttpResponse> {
        self.call_member("update")
    }

    /// Deletes the member with the request's `id`.
    pub fn delete(&self) -> PylonsResult<HttpResponse> {
        self.call_member("delete")
    }

    /// Shows the edit form for the member with the request's `id`.
    pub fn edit(&self) -> PylonsResult<HttpResponse> {
        self.call_member("edit")
    }
}
