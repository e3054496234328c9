//! Structured access logging.
//!
//! Emits one `tracing` event per request after the response is produced:
//!
//! | Field              | Value                                   |
//! |--------------------|-----------------------------------------|
//! | `http.method`      | request method                          |
//! | `http.path`        | request path                            |
//! | `http.status_code` | response status                         |
//! | `duration_ms`      | time spent in the rest of the chain     |
//! | `request_id`       | `request_id` attribute or response header |
//!
//! Server errors are logged at `warn`, everything else at `info`.

use std::time::Instant;

use hyperdrive_core::{Request, Response};
use serde_json::Value;

use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::request_id::{REQUEST_ID_ATTRIBUTE, REQUEST_ID_HEADER};

/// Middleware that logs every request.
#[derive(Debug, Clone, Default)]
pub struct AccessLogMiddleware {
    service: Option<String>,
}

impl AccessLogMiddleware {
    /// Creates an access logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `service` field to every event.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let start = Instant::now();
            let method = request.method().clone();
            let path = request.path().to_string();
            let attribute_id = request
                .attribute(REQUEST_ID_ATTRIBUTE)
                .and_then(Value::as_str)
                .map(str::to_string);

            let response = next.run(request).await;

            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            let status = response.status();
            let request_id = attribute_id
                .or_else(|| response.header(REQUEST_ID_HEADER).map(str::to_string))
                .unwrap_or_default();
            let service = self.service.as_deref().unwrap_or_default();

            if status.is_server_error() {
                tracing::warn!(
                    service,
                    http.method = %method,
                    http.path = %path,
                    http.status_code = status.as_u16(),
                    duration_ms,
                    request_id = %request_id,
                    "request failed"
                );
            } else {
                tracing::info!(
                    service,
                    http.method = %method,
                    http.path = %path,
                    http.status_code = status.as_u16(),
                    duration_ms,
                    request_id = %request_id,
                    "request completed"
                );
            }

            response
        })
    }
}
