//! Ordered middleware composition.
//!
//! A [`MiddlewarePipeline`] holds an ordered list of middleware, either as
//! ready instances or as container identifiers resolved when a request is
//! processed. The first middleware piped is the outermost: it sees the
//! request first and the response last.
//!
//! ```text
//! pipe(A).pipe(B)
//!
//! request  → A → B → handler
//! response ← A ← B ←──┘
//! ```

use std::future::Future;
use std::sync::Arc;

use hyperdrive_core::di::{Container, ServiceId};
use hyperdrive_core::{HyperdriveError, Request, Response};

use crate::error::{MiddlewareError, MiddlewareResult};
use crate::middleware::{BoxFuture, Middleware, Next};

/// A type-erased middleware that can be stored in a vector or a container.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A middleware reference: an instance, or an identifier to resolve.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// A ready instance.
    Instance(BoxedMiddleware),
    /// A container identifier resolved per request.
    Service(ServiceId),
}

impl MiddlewareRef {
    /// Wraps a middleware value.
    pub fn instance<M: Middleware>(middleware: M) -> Self {
        Self::Instance(Arc::new(middleware))
    }

    /// A human-readable label for logs.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Instance(middleware) => middleware.name(),
            Self::Service(id) => id.as_str(),
        }
    }
}

impl std::fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(middleware) => f.debug_tuple("Instance").field(&middleware.name()).finish(),
            Self::Service(id) => f.debug_tuple("Service").field(id).finish(),
        }
    }
}

impl From<BoxedMiddleware> for MiddlewareRef {
    fn from(middleware: BoxedMiddleware) -> Self {
        Self::Instance(middleware)
    }
}

impl From<ServiceId> for MiddlewareRef {
    fn from(id: ServiceId) -> Self {
        Self::Service(id)
    }
}

impl From<&ServiceId> for MiddlewareRef {
    fn from(id: &ServiceId) -> Self {
        Self::Service(id.clone())
    }
}

impl From<&'static str> for MiddlewareRef {
    fn from(id: &'static str) -> Self {
        Self::Service(ServiceId::from(id))
    }
}

impl From<String> for MiddlewareRef {
    fn from(id: String) -> Self {
        Self::Service(ServiceId::from(id))
    }
}

/// An ordered list of middleware wrapped around a terminal handler.
///
/// # Example
///
/// ```
/// use hyperdrive_core::{Request, Response};
/// use hyperdrive_middleware::{MiddlewarePipeline, RequestIdMiddleware};
/// use http::Method;
///
/// # tokio_test::block_on(async {
/// let pipeline = MiddlewarePipeline::new().pipe(RequestIdMiddleware::new());
///
/// let response = pipeline
///     .process(Request::new(Method::GET, "/"), |_request| async { Response::text("hi") })
///     .await;
///
/// assert!(response.header("x-request-id").is_some());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MiddlewarePipeline {
    stages: Vec<MiddlewareRef>,
    container: Option<Arc<Container>>,
}

impl MiddlewarePipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pipeline that resolves identifiers through `container`.
    #[must_use]
    pub fn with_container(container: Arc<Container>) -> Self {
        Self {
            stages: Vec::new(),
            container: Some(container),
        }
    }

    /// Appends a middleware instance.
    #[must_use]
    pub fn pipe<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(MiddlewareRef::instance(middleware));
        self
    }

    /// Appends a middleware reference.
    #[must_use]
    pub fn pipe_ref(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.stages.push(middleware.into());
        self
    }

    /// Appends several references, keeping their order.
    #[must_use]
    pub fn pipe_all<I>(mut self, middleware: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<MiddlewareRef>,
    {
        self.stages.extend(middleware.into_iter().map(Into::into));
        self
    }

    /// Number of piped middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if nothing has been piped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The piped references, outermost first.
    #[must_use]
    pub fn stages(&self) -> &[MiddlewareRef] {
        &self.stages
    }

    /// Resolves every stage to an instance, outermost first.
    pub fn resolve(&self) -> MiddlewareResult<Vec<BoxedMiddleware>> {
        self.stages.iter().map(|stage| self.resolve_stage(stage)).collect()
    }

    fn resolve_stage(&self, stage: &MiddlewareRef) -> MiddlewareResult<BoxedMiddleware> {
        match stage {
            MiddlewareRef::Instance(middleware) => Ok(Arc::clone(middleware)),
            MiddlewareRef::Service(id) => {
                let container = self
                    .container
                    .as_ref()
                    .ok_or_else(|| MiddlewareError::NoContainer(id.clone()))?;
                container
                    .resolve_id::<BoxedMiddleware>(id)
                    .map(|middleware| Arc::clone(&*middleware))
                    .map_err(|source| MiddlewareError::Resolution {
                        id: id.clone(),
                        source,
                    })
            }
        }
    }

    /// Runs `request` through every stage and then `handler`.
    ///
    /// A stage that cannot be resolved produces a 500 response; the handler
    /// is not called in that case.
    pub async fn process<H, Fut>(&self, request: Request, handler: H) -> Response
    where
        H: FnOnce(Request) -> Fut + Send,
        Fut: Future<Output = Response> + Send,
    {
        let stages = match self.resolve() {
            Ok(stages) => stages,
            Err(error) => {
                tracing::error!(middleware = %error.id(), error = %error, "middleware resolution failed");
                return HyperdriveError::from(error).into_response();
            }
        };

        build_chain(&stages, handler).run(request).await
    }
}

/// Folds `stages` around `handler`, innermost last, without recursion.
fn build_chain<'a, H, Fut>(stages: &'a [BoxedMiddleware], handler: H) -> Next<'a>
where
    H: FnOnce(Request) -> Fut + Send + 'a,
    Fut: Future<Output = Response> + Send + 'a,
{
    let mut next = Next::handler(move |request| -> BoxFuture<'a, Response> { Box::pin(handler(request)) });
    for middleware in stages.iter().rev() {
        next = Next::new(middleware.as_ref(), next);
    }
    next
}
