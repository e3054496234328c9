//! Correlation ids.
//!
//! The id lands in the `request_id` attribute before the rest of the chain
//! runs and in the `X-Request-ID` header of whatever response comes back,
//! short-circuits included. Fresh ids are UUID v7 and sort by creation time.

use http::HeaderValue;
use hyperdrive_core::{Request, Response};
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::{BoxFuture, Middleware, Next};

/// Response (and optionally request) header carrying the id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Attribute under which downstream code finds the id.
pub const REQUEST_ID_ATTRIBUTE: &str = "request_id";

/// Tags each request with a correlation id.
///
/// By default every request gets a new id. [`RequestIdMiddleware::trust_incoming`]
/// keeps a caller-supplied `X-Request-ID` as long as it is a UUID.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Always mints a new id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses a well-formed incoming id.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self { trust_incoming: true }
    }

    fn assign(&self, request: &Request) -> String {
        let supplied = self
            .trust_incoming
            .then(|| request.header(REQUEST_ID_HEADER))
            .flatten()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok());
        supplied.unwrap_or_else(Uuid::now_v7).to_string()
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(&'a self, mut request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let id = self.assign(&request);
            let header = HeaderValue::from_str(&id).ok();
            request.set_attribute(REQUEST_ID_ATTRIBUTE, Value::String(id));

            let response = next.run(request).await;
            match header {
                Some(value) => response.with_header(REQUEST_ID_HEADER, value),
                None => response,
            }
        })
    }
}
