//! Route and view predicates.
//!
//! A predicate is a test a request must pass before a route (or a view
//! registered against it) is selected. Routes built from
//! [`RouteOptions`](super::route::RouteOptions) carry the built-in predicates
//! defined here; callers add their own through [`predicate_fn`] or by
//! implementing [`Predicate`] directly.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::Method;
use regex::Regex;

use pylons_rs_core::{PylonsError, PylonsResult};

use crate::request::HttpRequest;

/// Opaque context handed to predicates by whoever evaluates them.
pub type PredicateContext = dyn Any + Send + Sync;

/// A test evaluated against a request.
///
/// `text` is a human-readable description, used by `routes` listings and
/// for comparing predicates.
pub trait Predicate: Send + Sync + fmt::Debug {
    /// Returns `true` if the request passes.
    fn matches(&self, context: Option<&PredicateContext>, request: &HttpRequest) -> bool;

    /// Describes the predicate.
    fn text(&self) -> String;
}

/// A predicate shared between routes and view registrations.
pub type SharedPredicate = Arc<dyn Predicate>;

type PredicateFn = dyn Fn(Option<&PredicateContext>, &HttpRequest) -> bool + Send + Sync;

/// A predicate backed by a closure.
pub struct FnPredicate {
    text: String,
    func: Arc<PredicateFn>,
}

impl fmt::Debug for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

impl Predicate for FnPredicate {
    fn matches(&self, context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        (self.func)(context, request)
    }

    fn text(&self) -> String {
        self.text.clone()
    }
}

/// Wraps a closure as a [`SharedPredicate`].
///
/// ```
/// use pylons_rs_http::urls::predicates::predicate_fn;
/// use pylons_rs_http::HttpRequest;
///
/// let pred = predicate_fn("has page", |_, request| request.param("page").is_some());
/// let request = HttpRequest::builder().query_string("page=2").build();
/// assert!(pred.matches(None, &request));
/// assert_eq!(pred.text(), "has page");
/// ```
pub fn predicate_fn<F>(text: impl Into<String>, func: F) -> SharedPredicate
where
    F: Fn(Option<&PredicateContext>, &HttpRequest) -> bool + Send + Sync + 'static,
{
    Arc::new(FnPredicate {
        text: text.into(),
        func: Arc::new(func),
    })
}

/// Matches when the request's XHR status equals the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XhrPredicate(pub bool);

impl Predicate for XhrPredicate {
    fn matches(&self, _context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        request.is_xhr() == self.0
    }

    fn text(&self) -> String {
        format!("xhr = {}", self.0)
    }
}

/// Matches requests using a given HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMethodPredicate(pub Method);

impl Predicate for RequestMethodPredicate {
    fn matches(&self, _context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        *request.method() == self.0
    }

    fn text(&self) -> String {
        format!("request method = {}", self.0)
    }
}

/// Matches when the request path matches a regex.
#[derive(Debug, Clone)]
pub struct PathInfoPredicate {
    source: String,
    regex: Regex,
}

impl PathInfoPredicate {
    /// Compiles a path-info predicate.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the regex is invalid.
    pub fn new(source: &str) -> PylonsResult<Self> {
        let regex = Regex::new(source).map_err(|e| {
            PylonsError::ConfigurationError(format!("Invalid path_info regex '{source}': {e}"))
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }
}

impl Predicate for PathInfoPredicate {
    fn matches(&self, _context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        self.regex.is_match(request.path())
    }

    fn text(&self) -> String {
        format!("path_info = {}", self.source)
    }
}

/// Matches when a query parameter is present, optionally with a given value.
///
/// Parsed from `"name"` or `"name=value"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParamPredicate {
    name: String,
    value: Option<String>,
}

impl RequestParamPredicate {
    /// Parses a `name` or `name=value` specification.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('=') {
            Some((name, value)) => Self {
                name: name.trim().to_string(),
                value: Some(value.trim().to_string()),
            },
            None => Self {
                name: spec.trim().to_string(),
                value: None,
            },
        }
    }
}

impl Predicate for RequestParamPredicate {
    fn matches(&self, _context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        match (&self.value, request.param(&self.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        }
    }

    fn text(&self) -> String {
        self.value.as_ref().map_or_else(
            || format!("request_param {}", self.name),
            |value| format!("request_param {} = {value}", self.name),
        )
    }
}

/// Matches when a header is present, optionally with a value matching a regex.
///
/// Parsed from `"Name"` or `"Name:regex"`.
#[derive(Debug, Clone)]
pub struct HeaderPredicate {
    name: String,
    value: Option<Regex>,
}

impl HeaderPredicate {
    /// Parses a `Name` or `Name:regex` specification.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the value regex is invalid.
    pub fn parse(spec: &str) -> PylonsResult<Self> {
        let Some((name, pattern)) = spec.split_once(':') else {
            return Ok(Self {
                name: spec.trim().to_string(),
                value: None,
            });
        };
        let regex = Regex::new(pattern.trim()).map_err(|e| {
            PylonsError::ConfigurationError(format!("Invalid header regex '{pattern}': {e}"))
        })?;
        Ok(Self {
            name: name.trim().to_string(),
            value: Some(regex),
        })
    }
}

impl Predicate for HeaderPredicate {
    fn matches(&self, _context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        match (&self.value, request.header(&self.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(regex), Some(actual)) => regex.is_match(actual),
        }
    }

    fn text(&self) -> String {
        self.value.as_ref().map_or_else(
            || format!("header {}", self.name),
            |regex| format!("header {} = {}", self.name, regex.as_str()),
        )
    }
}

/// Matches when the `Accept` header admits a media type.
///
/// `*/*` and `type/*` entries in the header are honoured. A request
/// without an `Accept` header accepts anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptPredicate(pub String);

impl Predicate for AcceptPredicate {
    fn matches(&self, _context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        let Some(accept) = request.accept() else {
            return true;
        };
        let wanted = self.0.to_ascii_lowercase();
        let wanted_type = wanted.split('/').next().unwrap_or_default();

        accept.split(',').any(|entry| {
            let media = entry
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            media == "*/*"
                || media == wanted
                || media
                    .strip_suffix("/*")
                    .is_some_and(|prefix| prefix == wanted_type)
        })
    }

    fn text(&self) -> String {
        format!("accept = {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_predicate() {
        let pred = predicate_fn("always", |_, _| true);
        assert!(pred.matches(None, &HttpRequest::builder().build()));
        assert_eq!(pred.text(), "always");
        assert!(format!("{pred:?}").contains("always"));
    }

    #[test]
    fn test_fn_predicate_receives_context() {
        let pred = predicate_fn("ctx", |context, _| {
            context
                .and_then(|c| c.downcast_ref::<String>())
                .is_some_and(|s| s == "root")
        });
        let request = HttpRequest::builder().build();
        let context = String::from("root");
        assert!(pred.matches(Some(&context), &request));
        assert!(!pred.matches(None, &request));
    }

    #[test]
    fn test_xhr_predicate() {
        let xhr = HttpRequest::builder()
            .header("X-Requested-With", "XMLHttpRequest")
            .build();
        let plain = HttpRequest::builder().build();
        assert!(XhrPredicate(true).matches(None, &xhr));
        assert!(!XhrPredicate(true).matches(None, &plain));
        assert!(XhrPredicate(false).matches(None, &plain));
    }

    #[test]
    fn test_request_method_predicate() {
        let pred = RequestMethodPredicate(Method::PUT);
        let put = HttpRequest::builder().method(Method::PUT).build();
        let get = HttpRequest::builder().build();
        assert!(pred.matches(None, &put));
        assert!(!pred.matches(None, &get));
        assert_eq!(pred.text(), "request method = PUT");
    }

    #[test]
    fn test_path_info_predicate() {
        let pred = PathInfoPredicate::new(r"^/messages/\d+$").unwrap();
        assert!(pred.matches(None, &HttpRequest::builder().path("/messages/12").build()));
        assert!(!pred.matches(None, &HttpRequest::builder().path("/messages/x").build()));
        assert!(PathInfoPredicate::new("(").is_err());
    }

    #[test]
    fn test_request_param_predicate() {
        let present = RequestParamPredicate::parse("page");
        let valued = RequestParamPredicate::parse("page=2");
        let request = HttpRequest::builder().query_string("page=2").build();
        let other = HttpRequest::builder().query_string("page=3").build();
        let none = HttpRequest::builder().build();
        assert!(present.matches(None, &request));
        assert!(!present.matches(None, &none));
        assert!(valued.matches(None, &request));
        assert!(!valued.matches(None, &other));
        assert_eq!(valued.text(), "request_param page = 2");
    }

    #[test]
    fn test_header_predicate() {
        let present = HeaderPredicate::parse("X-Token").unwrap();
        let valued = HeaderPredicate::parse("User-Agent:^curl/").unwrap();
        let request = HttpRequest::builder()
            .header("X-Token", "abc")
            .header("User-Agent", "curl/8.0")
            .build();
        let none = HttpRequest::builder().build();
        assert!(present.matches(None, &request));
        assert!(!present.matches(None, &none));
        assert!(valued.matches(None, &request));
        assert!(HeaderPredicate::parse("X:(").is_err());
    }

    #[test]
    fn test_accept_predicate() {
        let pred = AcceptPredicate("application/json".to_string());
        let json = HttpRequest::builder()
            .header("Accept", "text/html, application/json;q=0.9")
            .build();
        let wildcard = HttpRequest::builder().header("Accept", "application/*").build();
        let html = HttpRequest::builder().header("Accept", "text/html").build();
        let missing = HttpRequest::builder().build();
        assert!(pred.matches(None, &json));
        assert!(pred.matches(None, &wildcard));
        assert!(!pred.matches(None, &html));
        assert!(pred.matches(None, &missing));
    }
}
