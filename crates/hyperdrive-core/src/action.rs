//! Controller return values.
//!
//! A controller action returns anything implementing [`IntoActionResult`].
//! The dispatcher turns the resulting [`ActionResult`] into a [`Response`]:
//!
//! | Variant | Response |
//! |---|---|
//! | `Response` | passed through unchanged |
//! | `Structured` | 200, JSON body |
//! | `Scalar` | 200, text body |
//! | `Empty` | 204 |

use serde::Serialize;
use serde_json::Value;

use crate::error::HyperdriveError;
use crate::response::Response;

/// A normalized controller return value.
#[derive(Debug, Clone)]
pub enum ActionResult {
    /// An explicit response.
    Response(Response),
    /// An array or object.
    Structured(Value),
    /// A string, number or boolean.
    Scalar(String),
    /// Nothing.
    Empty,
}

impl ActionResult {
    /// Renders the result as a response.
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            Self::Response(response) => response,
            Self::Structured(value) => Response::json(value),
            Self::Scalar(text) => Response::text(text),
            Self::Empty => Response::no_content(),
        }
    }

    /// Classifies a JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::String(text) => Self::Scalar(text),
            Value::Bool(flag) => Self::Scalar(flag.to_string()),
            Value::Number(number) => Self::Scalar(number.to_string()),
            structured @ (Value::Array(_) | Value::Object(_)) => Self::Structured(structured),
        }
    }
}

/// Conversion into an [`ActionResult`].
///
/// Fails only when a value cannot be represented at all, which the
/// dispatcher reports as an unsupported return type.
pub trait IntoActionResult {
    /// Performs the conversion.
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError>;
}

impl IntoActionResult for ActionResult {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        Ok(self)
    }
}

impl IntoActionResult for Response {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        Ok(ActionResult::Response(self))
    }
}

impl IntoActionResult for Value {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        Ok(ActionResult::from_value(self))
    }
}

impl IntoActionResult for () {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        Ok(ActionResult::Empty)
    }
}

impl IntoActionResult for String {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        Ok(ActionResult::Scalar(self))
    }
}

impl IntoActionResult for &'static str {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        Ok(ActionResult::Scalar(self.to_string()))
    }
}

macro_rules! scalar_action_result {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoActionResult for $ty {
                fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
                    Ok(ActionResult::Scalar(self.to_string()))
                }
            }
        )*
    };
}

scalar_action_result!(bool, i32, i64, u32, u64, usize, f32, f64);

impl<T: IntoActionResult> IntoActionResult for Option<T> {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        self.map_or(Ok(ActionResult::Empty), IntoActionResult::into_action_result)
    }
}

/// Serializes any `T: Serialize` through `serde_json`.
///
/// # Example
///
/// ```
/// use hyperdrive_core::{ActionResult, IntoActionResult, Json};
///
/// #[derive(serde::Serialize)]
/// struct User { id: u64 }
///
/// let result = Json(User { id: 42 }).into_action_result().unwrap();
/// assert!(matches!(result, ActionResult::Structured(_)));
/// ```
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoActionResult for Json<T> {
    fn into_action_result(self) -> Result<ActionResult, HyperdriveError> {
        serde_json::to_value(&self.0)
            .map(ActionResult::from_value)
            .map_err(|e| HyperdriveError::internal_with_source("Unsupported return type", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_structured_becomes_json_200() {
        let response = json!({"id": 42}).into_action_result().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.payload().as_json(), Some(&json!({"id": 42})));
    }

    #[test]
    fn test_scalar_becomes_text_200() {
        let response = 42_i64.into_action_result().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.payload().as_text(), Some("42"));
    }

    #[test]
    fn test_none_becomes_204() {
        let response = None::<String>.into_action_result().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_response_passes_through() {
        let original = Response::text("teapot").with_status(StatusCode::IM_A_TEAPOT);
        let response = original.into_action_result().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_json_with_non_string_keys_is_unsupported() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple key");

        let err = Json(map).into_action_result().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("Unsupported return type"));
    }
}
