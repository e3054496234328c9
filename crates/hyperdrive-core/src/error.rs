//! The error every dispatch stage ends up rendering.
//!
//! Each [`HyperdriveError`] belongs to one [`ErrorCategory`], and the category
//! alone decides the status code and the machine-readable code:
//!
//! | Category | Status | Body |
//! |---|---|---|
//! | `NotFound` | 404 | envelope |
//! | `MethodNotAllowed` | 405 | envelope, plus `Allow` |
//! | `Validation` | 422 | `{"message", "errors"}` |
//! | `Authentication` | 401 | envelope |
//! | `Authorization` | 403 | envelope |
//! | `Internal` | 500 | `Server Error: <message>` as text |
//!
//! The envelope is `{"error": {"code", "message", "category"}}`.

use http::{header, HeaderValue, Method, StatusCode};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::response::Response;

/// Result type alias using [`HyperdriveError`].
pub type HyperdriveResult<T> = Result<T, HyperdriveError>;

/// Per-field messages, in the order the fields were checked.
pub type FieldErrors = IndexMap<String, String>;

/// Coarse classification of a [`HyperdriveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 404.
    NotFound,
    /// 405.
    MethodNotAllowed,
    /// 422.
    Validation,
    /// 401.
    Authentication,
    /// 403.
    Authorization,
    /// 500.
    Internal,
}

impl ErrorCategory {
    /// The response status for this category.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `code` field of the envelope, e.g. `NOT_FOUND`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "UNAUTHENTICATED",
            Self::Authorization => "FORBIDDEN",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// A failure that has to become an HTTP response.
///
/// ```
/// use hyperdrive_core::{ErrorCategory, HyperdriveError};
///
/// let err = HyperdriveError::not_found("/missing");
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// assert_eq!(err.status_code(), http::StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "Route not found: /missing");
/// ```
#[derive(Error, Debug)]
pub enum HyperdriveError {
    /// No route has this path.
    #[error("Route not found: {path}")]
    NotFound {
        /// Normalized request path.
        path: String,
    },

    /// Some route has this path, none with this method.
    #[error("Method {method} not allowed")]
    MethodNotAllowed {
        /// The request method.
        method: Method,
        /// What the path does accept.
        allowed: Vec<Method>,
    },

    /// Input was rejected field by field.
    #[error("{message}")]
    Validation {
        /// Summary line, `Validation failed`.
        message: String,
        /// First failing rule per field.
        errors: FieldErrors,
    },

    /// The caller is not identified.
    #[error("Unauthorized: {0}")]
    Authentication(String),

    /// The caller is identified but not allowed.
    #[error("Forbidden: {0}")]
    Authorization(String),

    /// A server-side failure.
    #[error("{message}")]
    Internal {
        /// Shown to clients only while error details are exposed.
        message: String,
        /// Kept for logs.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HyperdriveError {
    /// 404 for `path`.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// 405 for `method`; `allowed` becomes the `Allow` header.
    #[must_use]
    pub fn method_not_allowed(method: Method, allowed: Vec<Method>) -> Self {
        Self::MethodNotAllowed { method, allowed }
    }

    /// 422 with one message per failing field.
    #[must_use]
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    /// 401.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// 403.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// 500 without an underlying cause.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 500 wrapping `source`.
    pub fn internal_with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Which row of the table above this error falls in.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Authorization(_) => ErrorCategory::Authorization,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Shorthand for `self.category().status()`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().status()
    }

    /// The envelope body used for every category except validation and internal.
    #[must_use]
    pub fn envelope(&self) -> serde_json::Value {
        let category = self.category();
        serde_json::json!({
            "error": {
                "code": category.code(),
                "message": self.to_string(),
                "category": category,
            }
        })
    }

    /// Renders the error with the body shape of its category.
    #[must_use]
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let response = match self {
            Self::Validation { message, errors } => {
                Response::json(serde_json::json!({ "message": message, "errors": errors }))
            }
            Self::Internal { message, .. } => Response::text(format!("Server Error: {message}")),
            Self::MethodNotAllowed { ref allowed, .. } => {
                let body = Response::json(self.envelope());
                match allow_header(allowed) {
                    Some(value) => body.with_header(header::ALLOW, value),
                    None => body,
                }
            }
            other => Response::json(other.envelope()),
        };
        response.with_status(status)
    }
}

fn allow_header(methods: &[Method]) -> Option<HeaderValue> {
    let joined = methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    HeaderValue::from_str(&joined).ok()
}
