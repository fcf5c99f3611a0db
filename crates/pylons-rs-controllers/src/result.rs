//! Action results.

use pylons_rs_http::HttpResponse;

/// What a controller action returns.
///
/// A full response is used as-is; text and chunks become the body of a
/// `200 OK` response. Chunks are concatenated in order.
#[derive(Debug, Clone)]
pub enum ActionResult {
    /// A complete response.
    Response(HttpResponse),
    /// A text body.
    Text(String),
    /// A body produced in pieces.
    Chunks(Vec<String>),
}

impl ActionResult {
    /// Collects an iterator of chunks.
    ///
    /// ```
    /// use pylons_rs_controllers::ActionResult;
    ///
    /// let result = ActionResult::chunks(std::iter::repeat("hi").take(3));
    /// assert_eq!(result.into_response().body(), "hihihi");
    /// ```
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chunks(chunks.into_iter().map(Into::into).collect())
    }

    /// Converts the result into a response.
    pub fn into_response(self) -> HttpResponse {
        match self {
            Self::Response(response) => response,
            Self::Text(text) => HttpResponse::ok(text),
            Self::Chunks(chunks) => HttpResponse::ok(chunks.concat()),
        }
    }
}

impl From<HttpResponse> for ActionResult {
    fn from(response: HttpResponse) -> Self {
        Self::Response(response)
    }
}

impl From<String> for ActionResult {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ActionResult {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[test]
    fn test_response_passthrough() {
        let mut response = HttpResponse::ok("x");
        response.set_status(StatusCode::CREATED);
        let converted = ActionResult::from(response).into_response();
        assert_eq!(converted.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_text() {
        let response = ActionResult::from("hi there").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "hi there");
    }

    #[test]
    fn test_chunks() {
        let response = ActionResult::chunks(vec!["a", "b", "c"]).into_response();
        assert_eq!(response.body(), "abc");
    }
}
