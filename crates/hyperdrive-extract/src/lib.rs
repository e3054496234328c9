//! # Hyperdrive Extract
//!
//! Turning request input into typed action arguments.
//!
//! - [`coerce`] converts a captured route segment into the declared
//!   primitive type of an action parameter.
//! - [`Dto`] builds a typed structure from request data after checking it
//!   against a [`RuleSet`].
//!
//! ## Rules
//!
//! Rules are written per field, either as a pipe-delimited string or as a
//! list of [`Rule`] values:
//!
//! ```rust
//! use hyperdrive_extract::{Rule, RuleSet};
//!
//! let rules = RuleSet::new()
//!     .field("email", "required|email")
//!     .field("role", "in:admin,member")
//!     .field_rules("tags", [Rule::Array, Rule::max(5)]);
//!
//! assert!(rules.check().is_ok());
//! ```
//!
//! ## Errors
//!
//! Every error converts into [`hyperdrive_core::HyperdriveError`]: failed
//! validation becomes a 422 with a field-keyed error map, while coercion
//! failures and malformed rules are wiring mistakes and become a 500.

#![doc(html_root_url = "https://docs.rs/hyperdrive-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod dto;
mod error;
mod rules;
mod validator;

pub use coerce::{coerce, is_truthy, ParamType};
pub use dto::Dto;
pub use error::{CoercionError, DtoError, RuleError};
pub use rules::{Bound, Rule, RuleSet};
pub use validator::{ValidationErrors, Validator};
