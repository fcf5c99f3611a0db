//! Request dispatch over a configured registry.

use std::sync::Arc;

use pylons_rs_core::logging::request_span;
use pylons_rs_http::{HttpRequest, HttpResponse, PredicateContext};

use crate::registry::Registry;

/// A dispatcher over the routes and views of a [`Registry`].
///
/// Routes are tried in registration order. The first route whose path and
/// predicates match sets the request's match-dict; the first view registered
/// for that route whose predicates pass is called. Anything else is a 404.
///
/// # Examples
///
/// ```
/// use pylons_rs_config::{Configurator, HandlerOptions, HandlerSpec};
/// use pylons_rs_http::{HttpRequest, HttpResponse};
///
/// let config = Configurator::new();
/// let pages = HandlerSpec::new("Pages").action("about", |_| HttpResponse::ok("about us"));
/// config.add_handler("pages", Some("/pages/{action}"), pages, HandlerOptions::new()).unwrap();
///
/// let app = config.make_app();
/// let response = app.handle(HttpRequest::builder().path("/pages/about").build());
/// assert_eq!(response.body(), "about us");
/// ```
#[derive(Debug, Clone)]
pub struct Application {
    registry: Arc<Registry>,
}

impl Application {
    /// Creates an application over a registry.
    pub const fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Returns the registry.
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Dispatches a request.
    pub fn handle(&self, request: HttpRequest) -> HttpResponse {
        self.handle_with(None, request)
    }

    /// Dispatches a request, passing `context` to route and view predicates.
    pub fn handle_with(
        &self,
        context: Option<&PredicateContext>,
        mut request: HttpRequest,
    ) -> HttpResponse {
        let span = request_span(request.method().as_str(), request.path());
        let _guard = span.enter();

        let mapper = self.registry.routes_mapper();
        let Some(found) = mapper.route_request_with(context, &request) else {
            tracing::warn!("No route matched");
            return HttpResponse::not_found("Not Found");
        };
        request.set_matchdict(found.matchdict);

        let route_name = found.route.name();
        let views = self.registry.views_for_route(route_name);
        let Some(view) = views.iter().find(|v| v.matches(context, &request)) else {
            tracing::warn!(route = route_name, "No view matched");
            return HttpResponse::not_found("Not Found");
        };

        tracing::debug!(
            route = route_name,
            handler = view.view.name(),
            attr = ?view.attr,
            "Dispatching"
        );
        view.call(&request).unwrap_or_else(|| {
            tracing::warn!(
                route = route_name,
                handler = view.view.name(),
                attr = ?view.attr,
                "View has no callable action"
            );
            HttpResponse::not_found("Not Found")
        })
    }
}
