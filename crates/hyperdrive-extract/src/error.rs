//! Extraction error types.
//!
//! Route parameter coercion, rule parsing and DTO construction each have
//! their own error. All of them convert into [`HyperdriveError`] so the
//! dispatcher can turn them into a response.

use hyperdrive_core::{FieldErrors, HyperdriveError};
use thiserror::Error;

use crate::validator::ValidationErrors;

/// A route capture that cannot be converted to the declared type.
#[derive(Debug, Clone, Error)]
pub enum CoercionError {
    /// Not an integer.
    #[error("Route parameter {name} must be an integer, got {value:?}")]
    Int {
        /// Parameter name.
        name: String,
        /// Captured text.
        value: String,
    },

    /// Not a finite number.
    #[error("Route parameter {name} must be a number, got {value:?}")]
    Float {
        /// Parameter name.
        name: String,
        /// Captured text.
        value: String,
    },
}

/// A rule specification that cannot be parsed.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// The rule name is not part of the vocabulary.
    #[error("Unknown validation rule `{rule}`")]
    Unknown {
        /// The rule name as written.
        rule: String,
    },

    /// The rule exists but its argument is missing or malformed.
    #[error("Invalid argument for rule `{rule}`: {reason}")]
    InvalidArgument {
        /// The rule name.
        rule: String,
        /// What is wrong with the argument.
        reason: String,
    },
}

/// Failure to build a DTO from input data.
#[derive(Debug, Error)]
pub enum DtoError {
    /// One or more fields failed their rules.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// The DTO declares a rule that cannot be parsed.
    #[error("Invalid rules for field {field}: {source}")]
    Rules {
        /// The field declaring the rule.
        field: String,
        /// The parse error.
        #[source]
        source: RuleError,
    },

    /// The validated input does not fit the DTO's fields.
    #[error("Invalid input for {dto}: {source}")]
    Deserialize {
        /// The DTO type name.
        dto: &'static str,
        /// The serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl DtoError {
    /// Returns the field errors of a validation failure.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<CoercionError> for HyperdriveError {
    fn from(error: CoercionError) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<DtoError> for HyperdriveError {
    fn from(error: DtoError) -> Self {
        match error {
            DtoError::Validation(errors) => Self::validation(errors.into_inner()),
            DtoError::Deserialize { source, .. } => {
                let mut errors = FieldErrors::new();
                errors.insert("body".to_string(), source.to_string());
                Self::validation(errors)
            }
            rules @ DtoError::Rules { .. } => Self::internal(rules.to_string()),
        }
    }
}
