//! Routes and route matching.
//!
//! - [`pattern`]: route path syntax (`{name}` / `:name` / `*name`) and compilation
//! - [`predicates`]: the [`Predicate`](predicates::Predicate) trait and built-in route predicates
//! - [`route`]: a named [`Route`](route::Route) plus the options that build its predicates
//! - [`mapper`]: the ordered [`RoutesMapper`](mapper::RoutesMapper)
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use pylons_rs_http::urls::mapper::RoutesMapper;
//! use pylons_rs_http::urls::route::{Route, RouteOptions};
//! use pylons_rs_http::HttpRequest;
//!
//! let mut mapper = RoutesMapper::new();
//! let options = RouteOptions::new().request_method(http::Method::GET);
//! mapper.connect(Route::new("message", "messages/{id}", options.build_predicates().unwrap()).unwrap());
//!
//! let request = HttpRequest::builder().path("/messages/42").build();
//! let found = mapper.route_request(&request).unwrap();
//! assert_eq!(found.route.name(), "message");
//! assert_eq!(found.matchdict.get("id").unwrap(), "42");
//!
//! let mut kwargs = HashMap::new();
//! kwargs.insert("id", "7");
//! assert_eq!(mapper.generate("message", &kwargs).unwrap(), "/messages/7");
//! ```

pub mod mapper;
pub mod pattern;
pub mod predicates;
pub mod route;
