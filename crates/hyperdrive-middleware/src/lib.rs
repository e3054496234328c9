//! # Hyperdrive Middleware
//!
//! Middleware composition for the Hyperdrive framework.
//!
//! A [`MiddlewarePipeline`] wraps an ordered list of [`Middleware`] around a
//! terminal handler. Middleware piped first runs first on the way in and
//! last on the way out; a middleware that returns without calling
//! [`Next::run`] stops the chain.
//!
//! ```text
//! Request → Auth → Logging → Handler
//!                              ↓
//! Response ← Auth ← Logging ←──┘
//! ```
//!
//! Pipelines accept middleware instances directly, or container identifiers
//! that are resolved when a request is processed. Identifiers are registered
//! with [`ContainerMiddlewareExt`].
//!
//! ## Example
//!
//! ```
//! use hyperdrive_core::{HyperdriveError, Request, Response};
//! use hyperdrive_middleware::{FnMiddleware, MiddlewarePipeline};
//! use http::{Method, StatusCode};
//!
//! let auth = FnMiddleware::new("auth", |request, next| {
//!     Box::pin(async move {
//!         if request.bearer_token().is_none() {
//!             return HyperdriveError::authentication("Missing token").into_response();
//!         }
//!         next.run(request).await
//!     })
//! });
//!
//! # tokio_test::block_on(async {
//! let response = MiddlewarePipeline::new()
//!     .pipe(auth)
//!     .process(Request::new(Method::GET, "/me"), |_| async { Response::text("me") })
//!     .await;
//!
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hyperdrive-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod container;
mod error;
pub mod middleware;
pub mod pipeline;
pub mod stages;

pub use container::ContainerMiddlewareExt;
pub use error::{MiddlewareError, MiddlewareResult};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use pipeline::{BoxedMiddleware, MiddlewarePipeline, MiddlewareRef};
pub use stages::{AccessLogMiddleware, RequestIdMiddleware, REQUEST_ID_ATTRIBUTE, REQUEST_ID_HEADER};
