//! Named routes.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use http::Method;

use pylons_rs_core::PylonsResult;

use super::pattern::{compile_pattern, normalize_pattern, substitute, CompiledPattern};
use super::predicates::{
    AcceptPredicate, HeaderPredicate, PathInfoPredicate, PredicateContext,
    RequestMethodPredicate, RequestParamPredicate, SharedPredicate, XhrPredicate,
};
use crate::request::{HttpRequest, MatchDict};

/// A named URL pattern guarded by predicates.
///
/// The path is stored in colon form (`messages/:id`). Routes are immutable
/// once created.
#[derive(Clone)]
pub struct Route {
    name: String,
    path: String,
    compiled: CompiledPattern,
    predicates: Vec<SharedPredicate>,
}

impl Route {
    /// Creates a route, normalizing `{name}` placeholders to `:name`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the path cannot be compiled.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        predicates: Vec<SharedPredicate>,
    ) -> PylonsResult<Self> {
        let path = normalize_pattern(pattern);
        let compiled = compile_pattern(&path)?;
        Ok(Self {
            name: name.into(),
            path,
            compiled,
            predicates,
        })
    }

    /// Returns the route name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the normalized path pattern.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the route's predicates in order.
    pub fn predicates(&self) -> &[SharedPredicate] {
        &self.predicates
    }

    /// Matches a request path against this route's pattern.
    ///
    /// Leading slashes on the request path are ignored.
    pub fn match_path(&self, path: &str) -> Option<MatchDict> {
        let caps = self
            .compiled
            .regex()
            .captures(path.trim_start_matches('/'))?;
        Some(
            self.compiled
                .names()
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Matches a request: the path must match and every predicate must pass.
    pub fn match_request(
        &self,
        context: Option<&PredicateContext>,
        request: &HttpRequest,
    ) -> Option<MatchDict> {
        let matchdict = self.match_path(request.path())?;
        self.predicates
            .iter()
            .all(|p| p.matches(context, request))
            .then_some(matchdict)
    }

    /// Generates a URL for this route from placeholder values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a placeholder has no value.
    pub fn generate<S: BuildHasher>(&self, kwargs: &HashMap<&str, &str, S>) -> PylonsResult<String> {
        substitute(&self.path, kwargs)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("predicates", &self.predicates)
            .finish()
    }
}

/// Options that turn into route predicates.
///
/// [`build_predicates`](Self::build_predicates) emits one predicate per
/// supplied option, in the order `xhr`, `request_method`, `path_info`,
/// `request_param`, `header`, `accept`, then the custom predicates.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    xhr: Option<bool>,
    request_method: Option<Method>,
    path_info: Option<String>,
    request_param: Option<String>,
    header: Option<String>,
    accept: Option<String>,
    custom_predicates: Vec<SharedPredicate>,
}

impl RouteOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the request's XHR status to equal `xhr`.
    #[must_use]
    pub const fn xhr(mut self, xhr: bool) -> Self {
        self.xhr = Some(xhr);
        self
    }

    /// Requires an HTTP method.
    #[must_use]
    pub fn request_method(mut self, method: Method) -> Self {
        self.request_method = Some(method);
        self
    }

    /// Requires the request path to match a regex.
    #[must_use]
    pub fn path_info(mut self, regex: impl Into<String>) -> Self {
        self.path_info = Some(regex.into());
        self
    }

    /// Requires a query parameter (`name` or `name=value`).
    #[must_use]
    pub fn request_param(mut self, spec: impl Into<String>) -> Self {
        self.request_param = Some(spec.into());
        self
    }

    /// Requires a header (`Name` or `Name:regex`).
    #[must_use]
    pub fn header(mut self, spec: impl Into<String>) -> Self {
        self.header = Some(spec.into());
        self
    }

    /// Requires the `Accept` header to admit a media type.
    #[must_use]
    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept = Some(media_type.into());
        self
    }

    /// Appends a custom predicate.
    #[must_use]
    pub fn custom_predicate(mut self, predicate: SharedPredicate) -> Self {
        self.custom_predicates.push(predicate);
        self
    }

    /// Builds the predicates these options describe.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a `path_info` or `header` regex is invalid.
    pub fn build_predicates(&self) -> PylonsResult<Vec<SharedPredicate>> {
        let mut predicates: Vec<SharedPredicate> = Vec::new();
        if let Some(xhr) = self.xhr {
            predicates.push(Arc::new(XhrPredicate(xhr)));
        }
        if let Some(method) = &self.request_method {
            predicates.push(Arc::new(RequestMethodPredicate(method.clone())));
        }
        if let Some(regex) = &self.path_info {
            predicates.push(Arc::new(PathInfoPredicate::new(regex)?));
        }
        if let Some(spec) = &self.request_param {
            predicates.push(Arc::new(RequestParamPredicate::parse(spec)));
        }
        if let Some(spec) = &self.header {
            predicates.push(Arc::new(HeaderPredicate::parse(spec)?));
        }
        if let Some(media_type) = &self.accept {
            predicates.push(Arc::new(AcceptPredicate(media_type.clone())));
        }
        predicates.extend(self.custom_predicates.iter().cloned());
        Ok(predicates)
    }
}
