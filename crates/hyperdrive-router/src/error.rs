//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Result type alias using [`RouteError`].
pub type RouteResult<T> = Result<T, RouteError>;

/// A route declaration that cannot be compiled.
///
/// These surface at registration time; matching itself never fails.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A placeholder name is empty or not an identifier.
    #[error("Invalid placeholder {{{name}}} in route {template}")]
    InvalidPlaceholder {
        /// The route template.
        template: String,
        /// The offending name.
        name: String,
    },

    /// The same placeholder appears twice.
    #[error("Duplicate placeholder {{{name}}} in route {template}")]
    DuplicatePlaceholder {
        /// The route template.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// A `{` without its `}` or the other way round.
    #[error("Unbalanced braces in route {template}")]
    UnbalancedBraces {
        /// The route template.
        template: String,
    },

    /// Only GET, POST, PUT, PATCH and DELETE routes can be declared.
    #[error("Unsupported route method {0}")]
    UnsupportedMethod(Method),

    /// The generated pattern failed to compile.
    #[error("Invalid pattern for route {template}: {source}")]
    Pattern {
        /// The route template.
        template: String,
        /// The regex error.
        #[source]
        source: regex::Error,
    },
}
