//! Registering middleware in the service container.

use std::sync::Arc;

use hyperdrive_core::di::{Container, ContainerResult, Injectable, Resolver, ServiceId};

use crate::middleware::Middleware;
use crate::pipeline::BoxedMiddleware;

/// Container registration helpers for middleware.
///
/// Middleware stored this way is a singleton [`BoxedMiddleware`] under the
/// given identifier, which is what [`MiddlewarePipeline`] looks up when a
/// string identifier is piped.
///
/// [`MiddlewarePipeline`]: crate::MiddlewarePipeline
///
/// # Example
///
/// ```
/// use hyperdrive_core::di::{Container, ServiceId};
/// use hyperdrive_middleware::{ContainerMiddlewareExt, RequestIdMiddleware};
///
/// let mut container = Container::new();
/// container.middleware("request_id", |_| Ok(RequestIdMiddleware::new()));
///
/// assert!(container.has(&ServiceId::from("request_id")));
/// ```
pub trait ContainerMiddlewareExt {
    /// Registers middleware built by `factory` under `id`.
    fn middleware<M, F>(&mut self, id: impl Into<ServiceId>, factory: F) -> &mut Self
    where
        M: Middleware,
        F: Fn(&Resolver<'_>) -> ContainerResult<M> + Send + Sync + 'static;

    /// Registers `M`'s constructor and exposes the built middleware under `id`.
    fn register_middleware<M>(&mut self, id: impl Into<ServiceId>) -> &mut Self
    where
        M: Middleware + Injectable;

    /// Stores a ready middleware instance under `id`.
    fn middleware_instance<M: Middleware>(&mut self, id: impl Into<ServiceId>, middleware: M) -> &mut Self;
}

impl ContainerMiddlewareExt for Container {
    fn middleware<M, F>(&mut self, id: impl Into<ServiceId>, factory: F) -> &mut Self
    where
        M: Middleware,
        F: Fn(&Resolver<'_>) -> ContainerResult<M> + Send + Sync + 'static,
    {
        self.singleton_factory(id, move |resolver| {
            factory(resolver).map(|middleware| Arc::new(middleware) as BoxedMiddleware)
        })
    }

    fn register_middleware<M>(&mut self, id: impl Into<ServiceId>) -> &mut Self
    where
        M: Middleware + Injectable,
    {
        self.register::<M>();
        self.singleton_factory(id, |resolver| {
            resolver.resolve::<M>().map(|middleware| middleware as BoxedMiddleware)
        })
    }

    fn middleware_instance<M: Middleware>(&mut self, id: impl Into<ServiceId>, middleware: M) -> &mut Self {
        let boxed: BoxedMiddleware = Arc::new(middleware);
        self.instance(id, Arc::new(boxed))
    }
}
