//! HTTP response type.
//!
//! [`HttpResponse`] is what handler actions and controllers return. The body
//! is text and can be appended to after creation, which is how `after` hooks
//! decorate a response.

use http::{HeaderMap, HeaderValue, StatusCode};

/// An HTTP response with a text body.
///
/// # Examples
///
/// ```
/// use pylons_rs_http::HttpResponse;
///
/// let mut response = HttpResponse::ok("hi");
/// response.write(" from after");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.body(), "hi from after");
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    content_type: String,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` with the given status code and text body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            content_type: "text/html".to_string(),
        }
    }

    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns a reference to the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Sets the content type, also recording it as the `Content-Type` header.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            self.headers.insert(http::header::CONTENT_TYPE, value);
        }
    }

    /// Returns the response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Appends text to the body.
    pub fn write(&mut self, chunk: &str) {
        self.body.push_str(chunk);
    }
}

impl From<String> for HttpResponse {
    fn from(body: String) -> Self {
        Self::ok(body)
    }
}

impl From<&str> for HttpResponse {
    fn from(body: &str) -> Self {
        Self::ok(body)
    }
}
