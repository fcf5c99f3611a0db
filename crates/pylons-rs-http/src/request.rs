//! HTTP request type.
//!
//! [`HttpRequest`] carries what routing and handlers need: method, path,
//! headers, query parameters, the match-dict filled in when a route matches,
//! the template context object, and an optional session.

use std::collections::HashMap;

use http::{HeaderMap, Method};
use percent_encoding::percent_decode_str;

use crate::context::{ContextObj, Session};

/// The path variables captured by a matched route (`:id` -> `"42"`).
pub type MatchDict = HashMap<String, String>;

/// An HTTP request as seen by routes, predicates, and handlers.
///
/// # Examples
///
/// ```
/// use pylons_rs_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/messages/1")
///     .query_string("page=1")
///     .build();
///
/// assert_eq!(request.method(), &http::Method::GET);
/// assert_eq!(request.path(), "/messages/1");
/// assert_eq!(request.param("page"), Some("1"));
/// assert!(request.matchdict().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    params: HashMap<String, Vec<String>>,
    matchdict: Option<MatchDict>,
    tmpl_context: ContextObj,
    session: Option<Session>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`] for constructing an `HttpRequest`.
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the last value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns every value of a query parameter.
    pub fn param_list(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// Returns the match-dict, if a route has matched this request.
    pub const fn matchdict(&self) -> Option<&MatchDict> {
        self.matchdict.as_ref()
    }

    /// Returns a single match-dict value.
    pub fn match_value(&self, name: &str) -> Option<&str> {
        self.matchdict
            .as_ref()
            .and_then(|m| m.get(name))
            .map(String::as_str)
    }

    /// Sets the match-dict on this request.
    pub fn set_matchdict(&mut self, matchdict: MatchDict) {
        self.matchdict = Some(matchdict);
    }

    /// Returns the template context object.
    pub const fn tmpl_context(&self) -> &ContextObj {
        &self.tmpl_context
    }

    /// Returns a mutable reference to the template context object.
    pub fn tmpl_context_mut(&mut self) -> &mut ContextObj {
        &mut self.tmpl_context
    }

    /// Returns the session, if one is attached.
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Attaches a session to this request.
    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Returns `true` if the request was made via `XMLHttpRequest`.
    ///
    /// Checks for the `X-Requested-With: XMLHttpRequest` header.
    pub fn is_xhr(&self) -> bool {
        self.header("x-requested-with")
            .is_some_and(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
    }

    /// Returns the `Accept` header, if present.
    pub fn accept(&self) -> Option<&str> {
        self.header("accept")
    }
}

/// Parses a query string into a multi-value map, percent-decoding keys and values.
fn parse_query(query_string: &str) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    for pair in query_string.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .find('=')
            .map_or((pair, ""), |eq_pos| (&pair[..eq_pos], &pair[eq_pos + 1..]));
        params
            .entry(percent_decode(key))
            .or_default()
            .push(percent_decode(value));
    }
    params
}

fn percent_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    matchdict: Option<MatchDict>,
    tmpl_context: ContextObj,
    session: Option<Session>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            matchdict: None,
            tmpl_context: ContextObj::new(),
            session: None,
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Adds a single match-dict entry, creating the match-dict if needed.
    #[must_use]
    pub fn match_value(mut self, name: &str, value: &str) -> Self {
        self.matchdict
            .get_or_insert_with(MatchDict::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the whole match-dict.
    #[must_use]
    pub fn matchdict(mut self, matchdict: MatchDict) -> Self {
        self.matchdict = Some(matchdict);
        self
    }

    /// Sets the template context object.
    #[must_use]
    pub fn tmpl_context(mut self, tmpl_context: ContextObj) -> Self {
        self.tmpl_context = tmpl_context;
        self
    }

    /// Attaches a session.
    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Builds the [`HttpRequest`].
    pub fn build(self) -> HttpRequest {
        let params = parse_query(&self.query_string);
        HttpRequest {
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            headers: self.headers,
            params,
            matchdict: self.matchdict,
            tmpl_context: self.tmpl_context,
            session: self.session,
        }
    }
}
