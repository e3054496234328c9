//! # Hyperdrive
//!
//! **Controller dispatch for attribute-routed HTTP applications**
//!
//! Hyperdrive turns a request into a response in four steps:
//!
//! - 🧭 **Routing** – controllers declare their actions, which compile into an
//!   ordered route table
//! - 🔗 **Middleware** – global, then controller, then action middleware wrap
//!   every matched route
//! - 🧩 **Dependency injection** – controllers and services are built by an
//!   autowiring container
//! - 🎯 **Dispatch** – action parameters are resolved from the route, the
//!   request body and the container, and the result becomes a response
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hyperdrive::prelude::*;
//! use http::Method;
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
//!         ControllerDefinition::new().prefix("/users").action(
//!             Action::get("/{id}", "show", |_c: Arc<Self>, args: Arguments| async move {
//!                 let id: i64 = args.get("id")?;
//!                 Ok(json!({ "id": id }))
//!             })
//!             .param(Param::value("id", ParamType::Int)),
//!         )
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let app = Application::builder(HyperdriveConfig::default())
//!     .controller::<UserController>()
//!     .build()
//!     .unwrap();
//!
//! let response = app.handle(Request::new(Method::GET, "/users/42")).await;
//! assert_eq!(response.payload().as_json().unwrap()["id"], 42);
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Router → global MW → controller MW → action MW → Dispatcher → Action
//!                                                                           ↓
//! Response ←────────────────────── middleware unwinds ←─────── ActionResult ┘
//! ```

#![forbid(unsafe_code)]

mod arguments;
mod controller;
mod dispatcher;
mod error;
mod kernel;
mod module;

pub use arguments::{Arguments, Param};
pub use controller::{Action, ActionFuture, Controller, ControllerDefinition, ControllerRegistration};
pub use dispatcher::Dispatcher;
pub use error::{BuildError, DispatchError, DispatchResult};
pub use kernel::{Application, ApplicationBuilder, ENVIRONMENT_SERVICE};
pub use module::{Module, ServiceProvider};

pub use hyperdrive_core::{HyperdriveError, HyperdriveResult, Request, Response};
pub use hyperdrive_extract::ParamType;

// Re-export the component crates
pub use hyperdrive_config as config;
pub use hyperdrive_core as core;
pub use hyperdrive_extract as extract;
pub use hyperdrive_middleware as middleware;
pub use hyperdrive_router as router;
pub use hyperdrive_telemetry as telemetry;

/// Installs the global tracing subscriber described by `config.logging`.
///
/// # Errors
///
/// Fails if the level filter is invalid or a subscriber is already set.
pub fn init_logging(config: &hyperdrive_config::HyperdriveConfig) -> hyperdrive_telemetry::TelemetryResult<()> {
    hyperdrive_telemetry::init_logging(&config.logging.to_log_config())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hyperdrive::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action, Application, Arguments, Controller, ControllerDefinition, ControllerRegistration, Module, Param,
        ParamType, ServiceProvider,
    };

    pub use hyperdrive_core::{HyperdriveError, HyperdriveResult, Json, Request, Response};

    // Re-export DI types
    pub use hyperdrive_core::di::{
        Container, ContainerError, ContainerResult, Dependency, Injectable, ResolvedDependencies, ServiceId,
    };

    pub use hyperdrive_config::HyperdriveConfig;

    pub use hyperdrive_extract::{Dto, RuleSet};

    pub use hyperdrive_middleware::{ContainerMiddlewareExt, FnMiddleware, Middleware, Next};
}
