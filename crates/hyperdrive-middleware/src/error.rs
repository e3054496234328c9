//! Middleware errors.

use hyperdrive_core::di::{ContainerError, ServiceId};
use hyperdrive_core::HyperdriveError;
use thiserror::Error;

/// Result type for middleware resolution.
pub type MiddlewareResult<T> = Result<T, MiddlewareError>;

/// A middleware reference that cannot be turned into a runnable stage.
#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// A service id was piped but the pipeline has no container.
    #[error("Middleware {0} cannot be resolved without a container")]
    NoContainer(ServiceId),

    /// The container failed to resolve the middleware.
    #[error("Middleware {id} could not be resolved: {source}")]
    Resolution {
        /// The middleware identifier.
        id: ServiceId,
        /// The container error.
        #[source]
        source: ContainerError,
    },
}

impl MiddlewareError {
    /// The identifier of the middleware that failed.
    #[must_use]
    pub const fn id(&self) -> &ServiceId {
        match self {
            Self::NoContainer(id) | Self::Resolution { id, .. } => id,
        }
    }
}

impl From<MiddlewareError> for HyperdriveError {
    fn from(error: MiddlewareError) -> Self {
        Self::internal_with_source(error.to_string(), error)
    }
}
