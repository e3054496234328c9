//! Converting captured route segments into typed values.

use serde_json::{Number, Value};

use crate::error::CoercionError;

/// The declared type of a route-bound action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A signed 64-bit integer.
    Int,
    /// A finite 64-bit float.
    Float,
    /// `true` for `"true"`, `"1"`, `"yes"` and `"on"` (any case); otherwise `false`.
    Bool,
    /// The capture as text.
    String,
    /// The capture wrapped in a one-element array.
    Array,
    /// No declared type: the raw capture is passed through.
    Raw,
}

/// Converts a captured string to the parameter's declared type.
///
/// # Example
///
/// ```rust
/// use hyperdrive_extract::{coerce, ParamType};
/// use serde_json::json;
///
/// assert_eq!(coerce("id", "123", ParamType::Int).unwrap(), json!(123));
/// assert_eq!(coerce("flag", "Yes", ParamType::Bool).unwrap(), json!(true));
/// assert!(coerce("id", "abc", ParamType::Int).is_err());
/// ```
pub fn coerce(name: &str, raw: &str, ty: ParamType) -> Result<Value, CoercionError> {
    match ty {
        ParamType::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| CoercionError::Int {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        ParamType::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CoercionError::Float {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        ParamType::Bool => Ok(Value::Bool(is_truthy(raw))),
        ParamType::String | ParamType::Raw => Ok(Value::String(raw.to_string())),
        ParamType::Array => Ok(Value::Array(vec![Value::String(raw.to_string())])),
    }
}

/// Returns `true` for `true`, `1`, `yes` and `on`, ignoring case.
#[must_use]
pub fn is_truthy(raw: &str) -> bool {
    ["true", "1", "yes", "on"]
        .iter()
        .any(|truthy| raw.trim().eq_ignore_ascii_case(truthy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int() {
        assert_eq!(coerce("id", "123", ParamType::Int).unwrap(), json!(123));
        assert_eq!(coerce("id", "-7", ParamType::Int).unwrap(), json!(-7));
        assert!(matches!(
            coerce("id", "12abc", ParamType::Int),
            Err(CoercionError::Int { .. })
        ));
    }

    #[test]
    fn test_float() {
        assert_eq!(coerce("p", "1.5", ParamType::Float).unwrap(), json!(1.5));
        assert_eq!(coerce("p", "2", ParamType::Float).unwrap(), json!(2.0));
        assert!(coerce("p", "NaN", ParamType::Float).is_err());
        assert!(coerce("p", "one", ParamType::Float).is_err());
    }

    #[test]
    fn test_bool_truthy_values() {
        for raw in ["true", "TRUE", "1", "yes", "Yes", "on", "ON"] {
            assert_eq!(coerce("b", raw, ParamType::Bool).unwrap(), json!(true), "{raw}");
        }
        for raw in ["false", "0", "no", "off", "", "2"] {
            assert_eq!(coerce("b", raw, ParamType::Bool).unwrap(), json!(false), "{raw}");
        }
    }

    #[test]
    fn test_string_array_and_raw() {
        assert_eq!(coerce("s", "42", ParamType::String).unwrap(), json!("42"));
        assert_eq!(coerce("a", "x", ParamType::Array).unwrap(), json!(["x"]));
        assert_eq!(coerce("r", "x", ParamType::Raw).unwrap(), json!("x"));
    }
}
