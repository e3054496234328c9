//! Controller declarations.
//!
//! A controller is an [`Injectable`] type that lists its actions in a
//! [`ControllerDefinition`]. Each [`Action`] pairs a route declaration
//! with an async handler and the parameters the handler expects.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hyperdrive::prelude::*;
//! use serde_json::json;
//!
//! struct UserController;
//!
//! impl Injectable for UserController {
//!     fn construct(_deps: &mut ResolvedDependencies) -> ContainerResult<Self> {
//!         Ok(Self)
//!     }
//! }
//!
//! impl Controller for UserController {
//!     fn routes() -> ControllerDefinition<Self> {
//!         ControllerDefinition::new()
//!             .prefix("/users")
//!             .action(
//!                 Action::get("/{id}", "show", |_users: Arc<Self>, args: Arguments| async move {
//!                     let id: i64 = args.get("id")?;
//!                     Ok(json!({ "id": id }))
//!                 })
//!                 .param(Param::value("id", ParamType::Int)),
//!             )
//!     }
//! }
//! ```

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use hyperdrive_core::di::{Container, Injectable, Instance, ServiceId};
use hyperdrive_core::{ActionResult, HyperdriveError, IntoActionResult};
use hyperdrive_middleware::BoxFuture;
use hyperdrive_router::{ActionDeclaration, ControllerDeclaration};
use http::Method;

use crate::arguments::{Arguments, Param};

/// The future returned by a type-erased action handler.
pub type ActionFuture = BoxFuture<'static, Result<ActionResult, HyperdriveError>>;

type TypedHandler<C> = Arc<dyn Fn(Arc<C>, Arguments) -> ActionFuture + Send + Sync>;
pub(crate) type ErasedHandler = Arc<dyn Fn(Instance, Arguments) -> ActionFuture + Send + Sync>;

/// A type whose actions can be routed to.
///
/// The controller instance is resolved from the container for every
/// request. Types that are not bound explicitly are registered through
/// their [`Injectable`] implementation, which makes them transient.
pub trait Controller: Injectable {
    /// The controller's prefix, middleware and actions.
    fn routes() -> ControllerDefinition<Self>;
}

/// The declarations of one controller.
pub struct ControllerDefinition<C> {
    prefix: String,
    middleware: Vec<String>,
    actions: Vec<Action<C>>,
}

impl<C: Send + Sync + 'static> ControllerDefinition<C> {
    /// An empty definition with no prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            middleware: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Path prefix shared by every action.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Middleware applied to every action, before action-level middleware.
    #[must_use]
    pub fn middleware(mut self, id: impl Into<String>) -> Self {
        self.middleware.push(id.into());
        self
    }

    /// Adds an action.
    #[must_use]
    pub fn action(mut self, action: Action<C>) -> Self {
        self.actions.push(action);
        self
    }

    /// Number of declared actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no actions are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn compile(self, id: &ServiceId) -> CompiledController {
        let mut declaration = ControllerDeclaration::new(id.as_str()).prefix(self.prefix);
        for middleware in self.middleware {
            declaration = declaration.middleware(middleware);
        }

        let mut actions = Vec::with_capacity(self.actions.len());
        for action in self.actions {
            actions.push(ActionEntry {
                controller: id.clone(),
                action: action.declaration.action_name().to_string(),
                params: action.params,
                handler: erase(action.handler),
            });
            declaration.push_action(action.declaration);
        }

        CompiledController { declaration, actions }
    }
}

impl<C: Send + Sync + 'static> Default for ControllerDefinition<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ControllerDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDefinition")
            .field("controller", &type_name::<C>())
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware)
            .field("actions", &self.actions)
            .finish()
    }
}

/// One routable controller action.
pub struct Action<C> {
    declaration: ActionDeclaration,
    params: Vec<Param>,
    handler: TypedHandler<C>,
}

impl<C: Send + Sync + 'static> Action<C> {
    /// Declares an action for `method` at `path`, relative to the prefix.
    ///
    /// `name` is the action name the route points at. The handler receives
    /// the controller instance and the resolved [`Arguments`], and may
    /// return anything implementing [`IntoActionResult`].
    pub fn new<F, Fut, R>(method: Method, path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HyperdriveError>> + Send + 'static,
        R: IntoActionResult,
    {
        let handler: TypedHandler<C> = Arc::new(move |controller: Arc<C>, arguments: Arguments| -> ActionFuture {
            let future = handler(controller, arguments);
            Box::pin(async move { future.await?.into_action_result() })
        });

        Self {
            declaration: ActionDeclaration::new(method, path, name),
            params: Vec::new(),
            handler,
        }
    }

    /// A `GET` action.
    pub fn get<F, Fut, R>(path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HyperdriveError>> + Send + 'static,
        R: IntoActionResult,
    {
        Self::new(Method::GET, path, name, handler)
    }

    /// A `POST` action.
    pub fn post<F, Fut, R>(path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HyperdriveError>> + Send + 'static,
        R: IntoActionResult,
    {
        Self::new(Method::POST, path, name, handler)
    }

    /// A `PUT` action.
    pub fn put<F, Fut, R>(path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HyperdriveError>> + Send + 'static,
        R: IntoActionResult,
    {
        Self::new(Method::PUT, path, name, handler)
    }

    /// A `PATCH` action.
    pub fn patch<F, Fut, R>(path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HyperdriveError>> + Send + 'static,
        R: IntoActionResult,
    {
        Self::new(Method::PATCH, path, name, handler)
    }

    /// A `DELETE` action.
    pub fn delete<F, Fut, R>(path: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HyperdriveError>> + Send + 'static,
        R: IntoActionResult,
    {
        Self::new(Method::DELETE, path, name, handler)
    }

    /// Appends a parameter. Parameters resolve in the order they are added.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the symbolic route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.declaration = self.declaration.name(name);
        self
    }

    /// Adds action-level middleware, run after the controller's.
    #[must_use]
    pub fn middleware(mut self, id: impl Into<String>) -> Self {
        self.declaration = self.declaration.middleware(id);
        self
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("declaration", &self.declaration)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn erase<C: Send + Sync + 'static>(handler: TypedHandler<C>) -> ErasedHandler {
    Arc::new(move |instance: Instance, arguments: Arguments| -> ActionFuture {
        match instance.downcast::<C>() {
            Ok(controller) => handler(controller, arguments),
            Err(_) => Box::pin(std::future::ready(Err(HyperdriveError::internal(format!(
                "Controller instance is not a {}",
                type_name::<C>()
            ))))),
        }
    })
}

/// A registered action, ready for dispatch.
pub(crate) struct ActionEntry {
    pub(crate) controller: ServiceId,
    pub(crate) action: String,
    pub(crate) params: Vec<Param>,
    pub(crate) handler: ErasedHandler,
}

impl fmt::Debug for ActionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEntry")
            .field("controller", &self.controller)
            .field("action", &self.action)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub(crate) struct CompiledController {
    pub(crate) declaration: ControllerDeclaration,
    pub(crate) actions: Vec<ActionEntry>,
}

/// A type-erased handle to a [`Controller`], as listed by modules.
#[derive(Clone, Copy)]
pub struct ControllerRegistration {
    name: &'static str,
    install: fn(&mut Container) -> CompiledController,
}

impl ControllerRegistration {
    /// The registration for `C`.
    #[must_use]
    pub fn of<C: Controller>() -> Self {
        Self {
            name: type_name::<C>(),
            install: install::<C>,
        }
    }

    /// The controller's type name, which is also its container identifier.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn install(&self, container: &mut Container) -> CompiledController {
        (self.install)(container)
    }
}

impl fmt::Debug for ControllerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ControllerRegistration").field(&self.name).finish()
    }
}

fn install<C: Controller>(container: &mut Container) -> CompiledController {
    let id = ServiceId::of::<C>();
    if !container.bound(&id) {
        container.register::<C>();
    }
    C::routes().compile(&id)
}
