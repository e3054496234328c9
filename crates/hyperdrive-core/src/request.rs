//! The inbound request.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;
use http::header::{self, AsHeaderName, IntoHeaderName};
use http::{HeaderMap, HeaderValue, Method, Uri};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// One inbound HTTP call.
///
/// Built once at the server boundary, either field by field with the `with_*`
/// builders or from raw parts with [`Request::from_parts`]. After that only the
/// body data and the attribute bag change; middleware use attributes to hand
/// computed values (an authenticated user, a request ID) to later stages.
///
/// # Example
///
/// ```
/// use hyperdrive_core::Request;
/// use http::Method;
/// use serde_json::json;
///
/// let mut request = Request::new(Method::POST, "/users")
///     .with_data(json!({ "name": "Ada" }));
/// request.set_attribute("user_id", json!(7));
///
/// assert_eq!(request.input("name"), Some(&json!("Ada")));
/// assert_eq!(request.attribute("user_id"), Some(&json!(7)));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    data: Map<String, Value>,
    query: IndexMap<String, String>,
    attributes: HashMap<String, Value>,
    peer: Option<SocketAddr>,
}

impl Request {
    /// Creates a request with no headers, data or query.
    ///
    /// An empty path becomes `/`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if path.is_empty() {
            path.push('/');
        }
        Self {
            method,
            path,
            headers: HeaderMap::new(),
            data: Map::new(),
            query: IndexMap::new(),
            attributes: HashMap::new(),
            peer: None,
        }
    }

    /// Builds a request from transport-level parts.
    ///
    /// The query string is decoded with `serde_urlencoded`. The body is read as
    /// JSON when the content type says so and as form data for
    /// `application/x-www-form-urlencoded`; anything unparseable, and any JSON
    /// body that is not an object, leaves the data map empty.
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: &[u8]) -> Self {
        let query = uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default();

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let data = parse_body(&content_type, body);

        let mut request = Self::new(method, uri.path());
        request.headers = headers;
        request.query = query;
        request.data = data;
        request
    }

    /// Adds a header.
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Records the address of the connected peer.
    pub fn with_peer_addr(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Replaces the body data. Non-object values are ignored.
    pub fn with_data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.data = map;
        }
        self
    }

    /// Adds a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// The HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks up a header case-insensitively.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the token of an `Authorization: Bearer <token>` header.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header(header::AUTHORIZATION)?;
        let (scheme, token) = value.split_once(' ')?;
        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| token.trim())
            .filter(|token| !token.is_empty())
    }

    /// The `User-Agent` header.
    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT)
    }

    /// The connected peer, when the transport supplied one.
    pub const fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// The originating client address.
    ///
    /// The first `X-Forwarded-For` entry wins, then `X-Real-IP`, then the peer
    /// address. Entries that are not IP addresses are skipped.
    pub fn client_ip(&self) -> Option<IpAddr> {
        let forwarded = self
            .header("x-forwarded-for")
            .and_then(|list| list.split(',').next())
            .and_then(|first| first.trim().parse().ok());
        forwarded
            .or_else(|| self.header("x-real-ip").and_then(|ip| ip.trim().parse().ok()))
            .or_else(|| self.peer.map(|peer| peer.ip()))
    }

    /// The body-derived data map.
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// A single body field.
    pub fn input(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Replaces the body data.
    pub fn set_data(&mut self, data: Map<String, Value>) {
        self.data = data;
    }

    /// The query parameters, in the order they appeared.
    pub const fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// A single query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Reads an attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All attributes.
    pub const fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Replaces the path. The kernel stores the normalized path here before
    /// middleware run.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }
}

fn parse_body(content_type: &str, body: &[u8]) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }

    if content_type.contains("application/json") {
        return match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
    }

    if content_type.contains("application/x-www-form-urlencoded") {
        return serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect()
            })
            .unwrap_or_default();
    }

    Map::new()
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self::from_parts(parts.method, &parts.uri, parts.headers, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    #[test]
    fn test_client_ip_precedence() {
        let peer: SocketAddr = "10.0.0.9:52100".parse().unwrap();
        let base = Request::new(Method::GET, "/").with_peer_addr(peer);
        assert_eq!(base.client_ip(), Some(peer.ip()));

        let real = base.clone().with_header("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(real.client_ip(), "198.51.100.4".parse().ok());

        let forwarded = real.with_header(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 70.41.3.18, 150.172.238.178"),
        );
        assert_eq!(forwarded.client_ip(), "203.0.113.7".parse().ok());

        let garbage = base.with_header("x-forwarded-for", HeaderValue::from_static("unknown"));
        assert_eq!(garbage.client_ip(), Some(peer.ip()));
        assert_eq!(Request::new(Method::GET, "/").client_ip(), None);
    }

    #[test]
    fn test_user_agent() {
        let request = Request::new(Method::GET, "/")
            .with_header(header::USER_AGENT, HeaderValue::from_static("curl/8.5.0"));
        assert_eq!(request.user_agent(), Some("curl/8.5.0"));
        assert_eq!(Request::new(Method::GET, "/").user_agent(), None);
    }

    #[test]
    fn test_from_parts_parses_query_and_json_body() {
        let uri: Uri = "/search?q=rust&page=2".parse().unwrap();
        let request = Request::from_parts(
            Method::POST,
            &uri,
            json_headers(),
            br#"{"name":"Ada","age":36}"#,
        );

        assert_eq!(request.path(), "/search");
        assert_eq!(request.query_param("q"), Some("rust"));
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.input("name"), Some(&json!("Ada")));
        assert_eq!(request.input("age"), Some(&json!(36)));
    }

    #[test]
    fn test_from_parts_parses_form_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let uri: Uri = "/login".parse().unwrap();
        let request = Request::from_parts(Method::POST, &uri, headers, b"user=ada&remember=on");

        assert_eq!(request.input("user"), Some(&json!("ada")));
        assert_eq!(request.input("remember"), Some(&json!("on")));
    }

    #[test]
    fn test_invalid_json_body_yields_empty_data() {
        let uri: Uri = "/".parse().unwrap();
        let request = Request::from_parts(Method::POST, &uri, json_headers(), b"{not json");
        assert!(request.data().is_empty());

        let request = Request::from_parts(Method::POST, &uri, json_headers(), b"[1,2,3]");
        assert!(request.data().is_empty());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = Request::new(Method::GET, "/")
            .with_header("X-Api-Key", HeaderValue::from_static("secret"));

        assert_eq!(request.header("x-api-key"), Some("secret"));
        assert_eq!(request.header("X-API-KEY"), Some("secret"));
        assert_eq!(request.header("x-missing"), None);
    }

    #[test]
    fn test_bearer_token() {
        let request = Request::new(Method::GET, "/")
            .with_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(request.bearer_token(), Some("abc123"));

        let request = Request::new(Method::GET, "/")
            .with_header(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(request.bearer_token(), None);
    }

    #[test]
    fn test_attributes_are_writable() {
        let mut request = Request::new(Method::GET, "/");
        assert!(request.attribute("user").is_none());

        request.set_attribute("user", json!({"id": 1}));
        request.set_attribute("user", json!({"id": 2}));
        assert_eq!(request.attribute("user"), Some(&json!({"id": 2})));
        assert_eq!(request.attributes().len(), 1);
    }

    #[test]
    fn test_empty_path_becomes_root() {
        assert_eq!(Request::new(Method::GET, "").path(), "/");
    }
}
