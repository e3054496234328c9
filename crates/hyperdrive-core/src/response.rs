//! The outbound response.

use bytes::Bytes;
use http::header::{self, AsHeaderName, IntoHeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::Value;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// What a response carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No body.
    Empty,
    /// A structured value serialized as JSON.
    Json(Value),
    /// Plain text.
    Text(String),
}

impl Payload {
    /// Returns the JSON value, if this is a JSON payload.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text, if this is a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` for [`Payload::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Encodes the payload into body bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Empty => Bytes::new(),
            Self::Json(value) => Bytes::from(value.to_string()),
            Self::Text(text) => Bytes::from(text.clone()),
        }
    }
}

/// An HTTP response.
///
/// Every mutator consumes the response and returns the modified copy, so a
/// middleware that wraps a response never changes one another stage still
/// holds.
///
/// # Example
///
/// ```
/// use hyperdrive_core::Response;
/// use http::{HeaderValue, StatusCode};
/// use serde_json::json;
///
/// let response = Response::json(json!({ "id": 42 }))
///     .with_status(StatusCode::CREATED)
///     .with_header("x-request-id", HeaderValue::from_static("abc"));
///
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.header("content-type"), Some("application/json; charset=utf-8"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    payload: Payload,
}

impl Default for Response {
    fn default() -> Self {
        Self::no_content().with_status(StatusCode::OK)
    }
}

impl Response {
    /// A 200 response with a JSON body.
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self::with_payload(Payload::Json(value), JSON_CONTENT_TYPE)
    }

    /// A 200 response with a plain-text body.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_payload(Payload::Text(text.into()), TEXT_CONTENT_TYPE)
    }

    /// A 204 response with no body.
    #[must_use]
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            payload: Payload::Empty,
        }
    }

    /// 200 with `data` as JSON.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::json(data)
    }

    /// 201 with `data` as JSON.
    #[must_use]
    pub fn created(data: Value) -> Self {
        Self::json(data).with_status(StatusCode::CREATED)
    }

    /// 200 with the updated resource as JSON.
    #[must_use]
    pub fn updated(data: Value) -> Self {
        Self::json(data)
    }

    /// 204; a deleted resource has nothing to send back.
    #[must_use]
    pub fn deleted() -> Self {
        Self::no_content()
    }

    /// 404 with `{"error": message}`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::json(serde_json::json!({ "error": message.into() })).with_status(StatusCode::NOT_FOUND)
    }

    fn with_payload(payload: Payload, content_type: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status: StatusCode::OK,
            headers,
            payload,
        }
    }

    /// Returns a copy with a different status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns a copy with `name` set to `value`, replacing earlier values.
    #[must_use]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// All headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks up a header case-insensitively.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The payload.
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Splits the response into what a transport writes.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        let body = self.payload.to_bytes();
        (self.status, self.headers, body)
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(response: Response) -> Self {
        let (status, headers, body) = response.into_parts();
        let mut out = Self::new(body);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_helpers() {
        let cases = [
            (Response::ok(json!({"id": 1})), StatusCode::OK),
            (Response::created(json!({"id": 2})), StatusCode::CREATED),
            (Response::updated(json!({"id": 3})), StatusCode::OK),
            (Response::deleted(), StatusCode::NO_CONTENT),
            (Response::not_found("No user 9"), StatusCode::NOT_FOUND),
        ];
        for (response, status) in cases {
            assert_eq!(response.status(), status);
        }

        let created = Response::created(json!({"id": 2}));
        assert_eq!(created.payload().as_json(), Some(&json!({"id": 2})));
        assert_eq!(created.header("content-type"), Some("application/json; charset=utf-8"));

        let missing = Response::not_found("No user 9");
        assert_eq!(missing.payload().as_json(), Some(&json!({"error": "No user 9"})));
        assert!(Response::deleted().into_parts().2.is_empty());
    }

    #[test]
    fn test_json_defaults() {
        let response = Response::json(json!({"id": 42}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header(header::CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
        assert_eq!(response.payload().as_json(), Some(&json!({"id": 42})));
    }

    #[test]
    fn test_text_defaults() {
        let response = Response::text("pong");
        assert_eq!(response.header("Content-Type"), Some(TEXT_CONTENT_TYPE));
        assert_eq!(response.payload().as_text(), Some("pong"));
    }

    #[test]
    fn test_no_content() {
        let response = Response::no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.payload().is_empty());
        assert!(response.header(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_mutators_leave_original_untouched() {
        let original = Response::text("hi");
        let modified = original
            .clone()
            .with_status(StatusCode::ACCEPTED)
            .with_header("x-extra", HeaderValue::from_static("1"));

        assert_eq!(original.status(), StatusCode::OK);
        assert!(original.header("x-extra").is_none());
        assert_eq!(modified.status(), StatusCode::ACCEPTED);
        assert_eq!(modified.header("x-extra"), Some("1"));
    }

    #[test]
    fn test_into_parts_encodes_body() {
        let (status, headers, body) = Response::json(json!({"ok": true})).into_parts();
        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key(header::CONTENT_TYPE));
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }

    #[test]
    fn test_converts_into_http_response() {
        let response: http::Response<Bytes> = Response::text("x").with_status(StatusCode::IM_A_TEAPOT).into();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.body(), &Bytes::from_static(b"x"));
    }
}
