//! Container errors.

use thiserror::Error;

use super::ServiceId;

/// Result type alias using [`ContainerError`].
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors raised while registering or resolving services.
///
/// All of these are wiring mistakes: they surface at resolution time and are
/// never retried.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Nothing is bound or registered under the identifier.
    #[error("Service {0} not found")]
    NotFound(ServiceId),

    /// The identifier names an abstract service with no binding.
    #[error("Class {0} is not instantiable")]
    NotInstantiable(ServiceId),

    /// The identifier is already being constructed further up the stack.
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// The service that closed the cycle.
        service: ServiceId,
        /// The full resolution chain, e.g. `A -> B -> A`.
        chain: String,
    },

    /// A constructor parameter has no service type and no default.
    #[error("Cannot resolve parameter ${parameter} in {service}")]
    UnresolvableParameter {
        /// The parameter name.
        parameter: String,
        /// The type declaring the parameter.
        service: ServiceId,
    },

    /// The resolution stack grew past the configured limit.
    #[error("Maximum resolution depth of {max} exceeded while resolving {service}")]
    DepthExceeded {
        /// The service being resolved when the limit was hit.
        service: ServiceId,
        /// The configured limit.
        max: usize,
    },

    /// A resolved instance could not be downcast to the requested type.
    #[error("Service {service} does not have type {expected}")]
    TypeMismatch {
        /// The resolved identifier.
        service: ServiceId,
        /// The Rust type that was requested.
        expected: &'static str,
    },

    /// A user-supplied factory or constructor failed.
    #[error("Failed to build {service}: {source}")]
    Factory {
        /// The service whose factory failed.
        service: ServiceId,
        /// The underlying error.
        #[source]
        source: anyhow::Error,
    },
}

impl ContainerError {
    /// Wraps an arbitrary error raised while building `service`.
    pub fn factory(service: impl Into<ServiceId>, source: impl Into<anyhow::Error>) -> Self {
        Self::Factory {
            service: service.into(),
            source: source.into(),
        }
    }

    /// Returns `true` for [`ContainerError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`ContainerError::CircularDependency`].
    #[must_use]
    pub const fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}
