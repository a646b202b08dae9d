//! The response model written by route steps.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde_json::Value;

/// A response under construction.
///
/// Steps write it with `status(code).json(payload)`. Once [`json`](Self::json)
/// has been called the response counts as written; the dispatcher and the
/// serving layer use that flag to decide whether an error body is still needed.
///
/// # Example
///
/// ```
/// use dynaroute_core::Response;
/// use http::StatusCode;
///
/// let mut res = Response::new();
/// res.status(StatusCode::CREATED).json(serde_json::json!({"id": "42"}));
///
/// assert!(res.is_written());
/// assert_eq!(res.status_code(), StatusCode::CREATED);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
}

impl Response {
    /// Creates an unwritten `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status code.
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Writes a JSON body, marking the response as written.
    pub fn json(&mut self, body: Value) -> &mut Self {
        self.body = Some(body);
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the JSON body, if written.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns true once a body has been written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        self.body.is_some()
    }

    /// Converts into an `http` response.
    ///
    /// `204 No Content` and `304 Not Modified` never carry a body.
    #[must_use]
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let bodyless = matches!(self.status, StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED);
        let bytes = match self.body {
            Some(body) if !bodyless => Bytes::from(body.to_string()),
            _ => Bytes::new(),
        };
        let has_body = !bytes.is_empty();

        let mut response = http::Response::new(Full::new(bytes));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if has_body && !response.headers().contains_key(CONTENT_TYPE) {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: http::Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_new_response_is_unwritten() {
        let res = Response::new();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(!res.is_written());
        assert!(res.body().is_none());
    }

    #[test]
    fn test_status_then_json() {
        let mut res = Response::new();
        res.status(StatusCode::BAD_REQUEST)
            .json(serde_json::json!({"message": "IncompleteRequestHeaders"}));

        assert!(res.is_written());
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.body().unwrap()["message"], "IncompleteRequestHeaders");
    }

    #[tokio::test]
    async fn test_into_http_json() {
        let mut res = Response::new();
        res.json(serde_json::json!({"devices": []}));

        let http = res.into_http();
        assert_eq!(http.status(), StatusCode::OK);
        assert_eq!(http.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_text(http).await, r#"{"devices":[]}"#);
    }

    #[tokio::test]
    async fn test_into_http_no_content_drops_body() {
        let mut res = Response::new();
        res.status(StatusCode::NO_CONTENT).json(serde_json::json!({}));

        let http = res.into_http();
        assert_eq!(http.status(), StatusCode::NO_CONTENT);
        assert!(http.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(body_text(http).await, "");
    }

    #[test]
    fn test_custom_header_kept() {
        let mut res = Response::new();
        res.header("x-request-id", "abc").json(serde_json::json!(null));

        let http = res.into_http();
        assert_eq!(http.headers()["x-request-id"], "abc");
    }
}
