//! # pylons-rs-http
//!
//! HTTP layer for the pylons-rs framework. Provides the request and response
//! types handlers work with, the route path syntax, route predicates, and the
//! ordered routes mapper that the configurator populates.

pub mod context;
pub mod request;
pub mod response;
pub mod urls;

pub use context::{ContextObj, Session};
pub use request::{HttpRequest, HttpRequestBuilder, MatchDict};
pub use response::HttpResponse;
pub use urls::mapper::RoutesMapper;
pub use urls::predicates::{Predicate, PredicateContext, SharedPredicate};
pub use urls::route::Route;
