//! Data transfer objects.

use std::collections::HashMap;

use hyperdrive_core::Request;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DtoError;
use crate::rules::RuleSet;
use crate::validator::Validator;

/// A typed structure built from request data and checked against a rule set.
///
/// Fields are filled by deserializing the input map, so keys without a
/// matching field are ignored. Validation runs against the raw map first,
/// which lets rules such as `same` and `confirmed` see sibling keys that the
/// DTO itself does not declare.
///
/// # Example
///
/// ```rust
/// use hyperdrive_extract::{Dto, RuleSet};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Deserialize)]
/// struct CreateUser {
///     name: String,
///     email: String,
/// }
///
/// impl Dto for CreateUser {
///     fn rules() -> RuleSet {
///         RuleSet::new()
///             .field("name", "required|min:3")
///             .field("email", "required|email")
///     }
/// }
///
/// let data = json!({ "name": "Ada", "email": "ada@example.com", "extra": 1 });
/// let user = CreateUser::from_map(data.as_object().unwrap()).unwrap();
/// assert_eq!(user.name, "Ada");
///
/// let err = CreateUser::from_map(&Default::default()).unwrap_err();
/// assert!(err.validation_errors().unwrap().contains("name"));
/// ```
pub trait Dto: DeserializeOwned + Send + 'static {
    /// Per-field rules. Defaults to none.
    fn rules() -> RuleSet {
        RuleSet::new()
    }

    /// Custom messages keyed `field.rule`.
    fn messages() -> HashMap<String, String> {
        HashMap::new()
    }

    /// Display names substituted for field keys in default messages.
    fn field_names() -> HashMap<String, String> {
        HashMap::new()
    }

    /// Validates `data` and builds the DTO from it.
    fn from_map(data: &Map<String, Value>) -> Result<Self, DtoError> {
        let rules = Self::rules();
        let outcome = Validator::new(data, &rules)
            .with_messages(Self::messages())
            .with_field_names(Self::field_names())
            .validate();

        if let Err(error) = outcome {
            if let Some(errors) = error.validation_errors() {
                tracing::info!(
                    dto = std::any::type_name::<Self>(),
                    fields = ?errors.iter().map(|(field, _)| field).collect::<Vec<_>>(),
                    "DTO validation failed"
                );
            }
            return Err(error);
        }

        serde_json::from_value(Value::Object(data.clone())).map_err(|source| DtoError::Deserialize {
            dto: std::any::type_name::<Self>(),
            source,
        })
    }

    /// Builds the DTO from the request's body data.
    fn from_request(request: &Request) -> Result<Self, DtoError> {
        Self::from_map(request.data())
    }
}
