//! The [`Middleware`] trait and the [`Next`] link.
//!
//! A stage sees the request on the way in and the response on the way out.
//! Returning without calling [`Next::run`] answers the request from that stage.
//!
//! # Example
//!
//! ```
//! use hyperdrive_core::{Request, Response};
//! use hyperdrive_middleware::{BoxFuture, Middleware, Next};
//! use http::HeaderValue;
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn name(&self) -> &'static str {
//!         "powered_by"
//!     }
//!
//!     fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let response = next.run(request).await;
//!             response.with_header("x-powered-by", HeaderValue::from_static("hyperdrive"))
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use hyperdrive_core::{Request, Response};

/// Pinned, boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The terminal handler at the end of a chain.
pub(crate) type Handler<'a> = Box<dyn FnOnce(Request) -> BoxFuture<'a, Response> + Send + 'a>;

/// One stage of the pipeline.
///
/// `next` is consumed by [`Next::run`], so a stage reaches the inner chain at
/// most once. Failures are reported as error responses, never as panics.
pub trait Middleware: Send + Sync + 'static {
    /// A short name used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, usually by delegating to `next`.
    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response>;
}

/// The remainder of a middleware chain.
///
/// Consumed by [`Next::run`], so it can only be invoked once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Handler<'a>),
}

impl<'a> Next<'a> {
    /// Wraps `next` with `middleware`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Self) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal link that invokes `handler`.
    pub fn handler<F>(handler: F) -> Self
    where
        F: FnOnce(Request) -> BoxFuture<'a, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(handler)),
        }
    }

    /// Invokes the next middleware, or the handler at the end of the chain.
    pub async fn run(self, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(request, *next).await,
            NextInner::Handler(handler) => handler(request).await,
        }
    }

    /// Name of the middleware this link invokes, or `None` for the handler.
    #[must_use]
    pub fn peek(&self) -> Option<&'static str> {
        match &self.inner {
            NextInner::Chain { middleware, .. } => Some(middleware.name()),
            NextInner::Handler(_) => None,
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").field("middleware", &self.peek()).finish()
    }
}

/// Adapts a closure `(Request, Next) -> BoxFuture<Response>` into a stage.
///
/// # Example
///
/// ```
/// use hyperdrive_middleware::{FnMiddleware, Middleware};
///
/// let timing = FnMiddleware::new("timing", |request, next| {
///     Box::pin(async move {
///         let started = std::time::Instant::now();
///         let response = next.run(request).await;
///         tracing::debug!(elapsed = ?started.elapsed(), "request timed");
///         response
///     })
/// });
/// assert_eq!(timing.name(), "timing");
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, Response> + Send + Sync + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, Response> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        (self.func)(request, next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware").field("name", &self.name).finish()
    }
}
