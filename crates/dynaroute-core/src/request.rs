//! The request model seen by route steps.

use crate::context::RequestContext;
use crate::error::RouteError;
use bytes::Bytes;
use dynaroute_router::Params;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use http_body_util::{BodyExt, Full};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated caller of a request.
///
/// Known fields are typed; anything else a principal source returns is kept
/// in `extra` and serialized inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Identifier of the principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Additional attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Principal {
    /// Creates a principal known only by its id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Builds a principal from a logged-in session without a uid.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            id: None,
            first_name: session.first_name.clone(),
            last_name: session.last_name.clone(),
            email: session.email.clone(),
            extra: Map::new(),
        }
    }
}

/// Session data attached to a request by an outer layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identifier of the logged-in user, when known.
    #[serde(default)]
    pub uid: Option<String>,
    /// Whether the session is authenticated.
    #[serde(default)]
    pub logged_in: bool,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    /// Creates an anonymous session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a logged-in session for the given uid.
    #[must_use]
    pub fn for_uid(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            logged_in: true,
            ..Self::default()
        }
    }
}

/// An incoming request as seen by the steps of a compiled route.
///
/// Transport details are reduced to what steps need: the method, the path, the
/// headers, a JSON body and the decoded query string. Path parameters, the
/// principal and the [`RequestContext`] are filled in while the request is
/// dispatched.
///
/// # Example
///
/// ```
/// use dynaroute_core::Request;
/// use http::Method;
///
/// let request = Request::new(Method::POST, "/v1/devices")
///     .with_header("content-type", "application/json")
///     .with_body(serde_json::json!({"device_name": "Pump"}));
///
/// assert_eq!(request.header("Content-Type"), Some("application/json"));
/// assert_eq!(request.body()["device_name"], "Pump");
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Value,
    query: Map<String, Value>,
    params: Params,
    user: Option<Principal>,
    session: Option<Session>,
    context: RequestContext,
}

impl Request {
    /// Creates a request with an empty object body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Value::Object(Map::new()),
            query: Map::new(),
            params: Params::new(),
            user: None,
            session: None,
            context: RequestContext::new(),
        }
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Sets one query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Attaches a session.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Attaches a principal.
    #[must_use]
    pub fn with_user(mut self, user: Principal) -> Self {
        self.user = Some(user);
        self
    }

    /// Builds a request from an `http` request with a buffered body.
    ///
    /// JSON bodies are parsed as JSON, form bodies as `key=value` pairs, and an
    /// empty body becomes an empty object. Bodies with other content types are
    /// kept as a string. The query string is decoded the same way as forms.
    pub async fn from_http(request: http::Request<Full<Bytes>>) -> Result<Self, RouteError> {
        let (parts, body) = request.into_parts();
        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let media_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(media_type);
        let body = parse_body(media_type.as_deref(), &bytes)?;
        let query = match parts.uri.query() {
            Some(raw) => decode_pairs(raw.as_bytes())
                .map_err(|e| RouteError::invalid_payload(format!("malformed query string: {e}")))?,
            None => Map::new(),
        };

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: parts.headers,
            body,
            query,
            params: Params::new(),
            user: None,
            session: None,
            context: RequestContext::new(),
        })
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns all headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers as a JSON object with lower-case names.
    ///
    /// Repeated headers are joined with `", "`. Values that are not visible
    /// ASCII are skipped.
    #[must_use]
    pub fn headers_json(&self) -> Value {
        let mut map = Map::new();
        for name in self.headers.keys() {
            let values: Vec<&str> = self
                .headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect();
            if !values.is_empty() {
                map.insert(name.as_str().to_string(), Value::String(values.join(", ")));
            }
        }
        Value::Object(map)
    }

    /// Returns the value of the `content-type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: Value) {
        self.body = body;
    }

    /// Returns the decoded query string.
    #[must_use]
    pub const fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Replaces the path parameters.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Returns the path parameters as a JSON object keyed like [`Params`].
    #[must_use]
    pub fn params_json(&self) -> Value {
        Value::Object(
            self.params
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }

    /// Returns the resolved principal.
    #[must_use]
    pub const fn user(&self) -> Option<&Principal> {
        self.user.as_ref()
    }

    /// Sets the resolved principal.
    pub fn set_user(&mut self, user: Option<Principal>) {
        self.user = user;
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Sets the session.
    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    /// Returns the request context.
    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Returns the request context mutably.
    pub fn context_mut(&mut self) -> &mut RequestContext {
        &mut self.context
    }
}

/// Returns the lower-cased media type of a content-type value, without parameters.
///
/// ```
/// use dynaroute_core::media_type;
///
/// assert_eq!(media_type("Application/JSON; charset=utf-8"), "application/json");
/// ```
#[must_use]
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn parse_body(media_type: Option<&str>, bytes: &Bytes) -> Result<Value, RouteError> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    match media_type {
        Some("application/json") => serde_json::from_slice(bytes).map_err(|e| {
            RouteError::invalid_payload_with_details(
                "request body is not valid JSON",
                serde_json::json!({ "reason": e.to_string() }),
            )
        }),
        Some("application/x-www-form-urlencoded") => decode_pairs(bytes)
            .map(Value::Object)
            .map_err(|e| RouteError::invalid_payload(format!("malformed form body: {e}"))),
        _ => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

/// Decodes `key=value` pairs. A key seen more than once collects its values
/// into an array.
fn decode_pairs(raw: &[u8]) -> Result<Map<String, Value>, serde_urlencoded::de::Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw)?;
    let mut map = Map::new();

    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_request(method: Method, uri: &str, content_type: &str, body: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    #[test]
    fn test_new_request_defaults() {
        let request = Request::new(Method::GET, "/v1/devices");
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/v1/devices");
        assert_eq!(request.body(), &serde_json::json!({}));
        assert!(request.query().is_empty());
        assert!(request.params().is_empty());
        assert!(request.user().is_none());
        assert!(request.session().is_none());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = Request::new(Method::GET, "/").with_header("X-Api-Key", "secret");
        assert_eq!(request.header("x-api-key"), Some("secret"));
        assert_eq!(request.header("X-API-KEY"), Some("secret"));
    }

    #[test]
    fn test_headers_json_uses_lower_case_names() {
        let request = Request::new(Method::GET, "/")
            .with_header("X-Tenant", "acme")
            .with_header("Accept", "text/html")
            .with_header("Accept", "application/json");

        let json = request.headers_json();
        assert_eq!(json["x-tenant"], "acme");
        assert_eq!(json["accept"], "text/html, application/json");
    }

    #[test]
    fn test_params_json() {
        let mut request = Request::new(Method::GET, "/v1/devices/42");
        let mut params = Params::new();
        params.push(":id", "42");
        request.set_params(params);

        assert_eq!(request.params_json(), serde_json::json!({":id": "42"}));
    }

    #[test]
    fn test_principal_serialization() {
        let mut principal = Principal::with_id("u-1");
        principal.first_name = Some("Ada".to_string());
        principal.extra.insert("role".to_string(), serde_json::json!("admin"));

        let json = serde_json::to_value(&principal).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "u-1", "firstName": "Ada", "role": "admin"})
        );

        let back: Principal = serde_json::from_value(json).unwrap();
        assert_eq!(back, principal);
    }

    #[test]
    fn test_principal_from_session() {
        let session = Session {
            logged_in: true,
            first_name: Some("Grace".to_string()),
            email: Some("grace@example.com".to_string()),
            ..Session::default()
        };

        let principal = Principal::from_session(&session);
        assert!(principal.id.is_none());
        assert_eq!(principal.first_name.as_deref(), Some("Grace"));
        assert_eq!(principal.email.as_deref(), Some("grace@example.com"));
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("application/json"), "application/json");
        assert_eq!(media_type(" Application/Json ;charset=utf-8"), "application/json");
        assert_eq!(media_type(""), "");
    }

    #[tokio::test]
    async fn test_from_http_json_body() {
        let request = Request::from_http(http_request(
            Method::POST,
            "/v1/devices?limit=10",
            "application/json; charset=utf-8",
            r#"{"device_name":"Pump"}"#,
        ))
        .await
        .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "/v1/devices");
        assert_eq!(request.body()["device_name"], "Pump");
        assert_eq!(request.query()["limit"], "10");
    }

    #[tokio::test]
    async fn test_from_http_form_body() {
        let request = Request::from_http(http_request(
            Method::PUT,
            "/v1/devices/1",
            "application/x-www-form-urlencoded",
            "name=Pump&tag=a&tag=b",
        ))
        .await
        .unwrap();

        assert_eq!(request.body()["name"], "Pump");
        assert_eq!(request.body()["tag"], serde_json::json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_from_http_empty_body() {
        let request = Request::from_http(http_request(Method::GET, "/v1/devices", "application/json", ""))
            .await
            .unwrap();
        assert_eq!(request.body(), &serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_from_http_invalid_json() {
        let err = Request::from_http(http_request(
            Method::POST,
            "/v1/devices",
            "application/json",
            "{not json",
        ))
        .await
        .unwrap_err();

        assert!(matches!(err, RouteError::InvalidRequestPayload { .. }));
    }

    #[tokio::test]
    async fn test_from_http_other_content_type_keeps_text() {
        let request = Request::from_http(http_request(Method::POST, "/upload", "text/plain", "hello"))
            .await
            .unwrap();
        assert_eq!(request.body(), &Value::String("hello".to_string()));
    }
}
