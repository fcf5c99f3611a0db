//! The ordered routing table.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use pylons_rs_core::{PylonsError, PylonsResult};

use super::predicates::PredicateContext;
use super::route::Route;
use crate::request::{HttpRequest, MatchDict};

/// The result of routing a request.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matching route.
    pub route: Arc<Route>,
    /// Values captured from the path.
    pub matchdict: MatchDict,
}

/// Routes in registration order.
///
/// Several routes may share a name; [`get_route`](Self::get_route) returns
/// the most recently connected one while [`get_routes`](Self::get_routes)
/// keeps them all.
#[derive(Debug, Clone, Default)]
pub struct RoutesMapper {
    routes: Vec<Arc<Route>>,
}

impl RoutesMapper {
    /// Creates an empty mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route, returning the shared handle.
    pub fn connect(&mut self, route: Route) -> Arc<Route> {
        let route = Arc::new(route);
        tracing::debug!(name = route.name(), path = route.path(), "Connected route");
        self.routes.push(Arc::clone(&route));
        route
    }

    /// Returns every route in registration order.
    pub fn get_routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Returns the most recently connected route with this name.
    pub fn get_route(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes.iter().rev().find(|r| r.name() == name)
    }

    /// Returns `true` if no routes are connected.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the number of connected routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Finds the first route whose path and predicates match the request.
    pub fn route_request(&self, request: &HttpRequest) -> Option<RouteMatch> {
        self.route_request_with(None, request)
    }

    /// Like [`route_request`](Self::route_request), passing a predicate context.
    pub fn route_request_with(
        &self,
        context: Option<&PredicateContext>,
        request: &HttpRequest,
    ) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route
                .match_request(context, request)
                .map(|matchdict| RouteMatch {
                    route: Arc::clone(route),
                    matchdict,
                })
        })
    }

    /// Generates a URL for the named route.
    ///
    /// # Errors
    ///
    /// Returns [`PylonsError::NotFound`] if no route has this name, or a
    /// configuration error if a placeholder has no value.
    pub fn generate<S: BuildHasher>(
        &self,
        name: &str,
        kwargs: &HashMap<&str, &str, S>,
    ) -> PylonsResult<String> {
        let route = self
            .get_route(name)
            .ok_or_else(|| PylonsError::NotFound(format!("No route named '{name}'")))?;
        route.generate(kwargs)
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::urls::route::RouteOptions;

    fn route(name: &str, pattern: &str) -> Route {
        Route::new(name, pattern, vec![]).unwrap()
    }

    #[test]
    fn test_routes_keep_order() {
        let mut mapper = RoutesMapper::new();
        mapper.connect(route("a", "a"));
        mapper.connect(route("b", "b"));
        let names: Vec<&str> = mapper.get_routes().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(mapper.len(), 2);
        assert!(!mapper.is_empty());
    }

    #[test]
    fn test_get_route_returns_latest() {
        let mut mapper = RoutesMapper::new();
        mapper.connect(route("name", "/first"));
        mapper.connect(route("name", "/second"));
        assert_eq!(mapper.get_route("name").unwrap().path(), "/second");
        assert!(mapper.get_route("missing").is_none());
    }

    #[test]
    fn test_route_request_first_match_wins() {
        let mut mapper = RoutesMapper::new();
        let post = RouteOptions::new().request_method(Method::POST);
        mapper.connect(Route::new("create", "messages", post.build_predicates().unwrap()).unwrap());
        mapper.connect(route("index", "messages"));

        let get = HttpRequest::builder().path("/messages").build();
        assert_eq!(mapper.route_request(&get).unwrap().route.name(), "index");

        let post = HttpRequest::builder()
            .method(Method::POST)
            .path("/messages")
            .build();
        assert_eq!(mapper.route_request(&post).unwrap().route.name(), "create");
    }

    #[test]
    fn test_route_request_no_match() {
        let mut mapper = RoutesMapper::new();
        mapper.connect(route("index", "messages"));
        let request = HttpRequest::builder().path("/users").build();
        assert!(mapper.route_request(&request).is_none());
    }

    #[test]
    fn test_generate() {
        let mut mapper = RoutesMapper::new();
        mapper.connect(route("message", "messages/{id}"));
        let mut kwargs = HashMap::new();
        kwargs.insert("id", "1");
        assert_eq!(mapper.generate("message", &kwargs).unwrap(), "/messages/1");
        assert!(matches!(
            mapper.generate("nope", &kwargs),
            Err(PylonsError::NotFound(_))
        ));
    }
}
