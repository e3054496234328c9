//! Dispatch and boot errors.

use hyperdrive_core::di::ContainerError;
use hyperdrive_core::HyperdriveError;
use hyperdrive_extract::{CoercionError, DtoError};
use hyperdrive_router::RouteError;
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Why a matched route could not produce an [`ActionResult`](hyperdrive_core::ActionResult).
///
/// The dispatcher always turns these into a response; they never escape
/// [`Application::handle`](crate::Application::handle).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The route names an action with no registered handler.
    #[error("Method {action} does not exist in controller {controller}")]
    UnknownAction {
        /// The controller identifier.
        controller: String,
        /// The action name.
        action: String,
    },

    /// The controller instance could not be resolved.
    #[error("Cannot resolve controller {controller}: {source}")]
    Controller {
        /// The controller identifier.
        controller: String,
        /// The container failure.
        #[source]
        source: ContainerError,
    },

    /// No resolution rule produced a value for a parameter.
    #[error("Cannot resolve parameter ${parameter} in {controller}::{action}")]
    UnresolvableParameter {
        /// The parameter name.
        parameter: String,
        /// The controller identifier.
        controller: String,
        /// The action name.
        action: String,
        /// The service lookup failure, when the parameter named a service.
        #[source]
        source: Option<ContainerError>,
    },

    /// A route capture could not be converted to the declared type.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// A DTO parameter failed validation or deserialization.
    #[error(transparent)]
    Dto(#[from] DtoError),

    /// The action itself returned an error.
    #[error(transparent)]
    Action(#[from] HyperdriveError),
}

impl From<DispatchError> for HyperdriveError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::Action(error) => error,
            DispatchError::Dto(error) => error.into(),
            DispatchError::Coercion(error) => error.into(),
            other => {
                let message = other.to_string();
                Self::internal_with_source(message, other)
            }
        }
    }
}

/// Errors raised while building an [`Application`](crate::Application).
///
/// These are wiring mistakes and surface once, at boot.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A route template failed to compile.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Two actions on one controller share a name.
    #[error("Action {action} is declared twice in controller {controller}")]
    DuplicateAction {
        /// The controller identifier.
        controller: String,
        /// The repeated action name.
        action: String,
    },

    /// A middleware identifier has nothing bound in the container.
    #[error("Middleware {id} could not be resolved{}", .route.as_ref().map(|r| format!(" (route {r})")).unwrap_or_default())]
    UnknownMiddleware {
        /// The middleware identifier.
        id: String,
        /// The route that references it, for route-level middleware.
        route: Option<String>,
    },

    /// A service provider or module failed to boot.
    #[error("Failed to boot {name}: {source}")]
    Boot {
        /// The provider or module name.
        name: String,
        /// The container failure.
        #[source]
        source: ContainerError,
    },
}
