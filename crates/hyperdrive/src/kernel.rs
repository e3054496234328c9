//! The application kernel.
//!
//! [`Application`] owns everything a request needs: the configuration, the
//! container, the router and the dispatcher. It is assembled once with an
//! [`ApplicationBuilder`] and is immutable afterwards, so a single instance
//! can serve concurrent requests behind an `Arc`.
//!
//! ```text
//! Request → normalize path → Router ─┬─ NotFound          → 404
//!                                    ├─ MethodNotAllowed  → 405 + Allow
//!                                    └─ Matched → global middleware
//!                                                 → route middleware
//!                                                 → Dispatcher → Response
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyperdrive_config::HyperdriveConfig;
use hyperdrive_core::di::{Container, ServiceId};
use hyperdrive_core::{HyperdriveError, Request, Response};
use hyperdrive_middleware::{MiddlewarePipeline, MiddlewareRef};
use hyperdrive_router::{normalize_path, Resolution, RouteCollector, Router};

use crate::controller::{Controller, ControllerRegistration};
use crate::dispatcher::Dispatcher;
use crate::error::BuildError;
use crate::module::{Module, ProviderRegistry, ServiceProvider};

/// Container identifier of the environment name (`"development"`, ...).
pub const ENVIRONMENT_SERVICE: &str = "environment";

/// A built application.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hyperdrive::prelude::*;
/// use http::{Method, StatusCode};
///
/// struct Health;
///
/// impl Injectable for Health {
///     fn construct(_deps: &mut ResolvedDependencies) -> ContainerResult<Self> {
///         Ok(Self)
///     }
/// }
///
/// impl Controller for Health {
///     fn routes() -> ControllerDefinition<Self> {
///         ControllerDefinition::new().action(Action::get("/health", "check", |_: Arc<Self>, _: Arguments| async {
///             Ok("ok")
///         }))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let app = Application::builder(HyperdriveConfig::default())
///     .controller::<Health>()
///     .build()
///     .unwrap();
///
/// let response = app.handle(Request::new(Method::GET, "/health")).await;
/// assert_eq!(response.status(), StatusCode::OK);
///
/// let missing = app.handle(Request::new(Method::GET, "/nope")).await;
/// assert_eq!(missing.status(), StatusCode::NOT_FOUND);
/// # });
/// ```
#[derive(Debug)]
pub struct Application {
    config: HyperdriveConfig,
    container: Arc<Container>,
    router: Router,
    middleware: Vec<MiddlewareRef>,
    dispatcher: Dispatcher,
    modules: Vec<&'static str>,
    providers: Vec<&'static str>,
    boot_duration: Duration,
}

impl Application {
    /// Starts building an application around `config`.
    ///
    /// Boot timing starts here.
    #[must_use]
    pub fn builder(config: HyperdriveConfig) -> ApplicationBuilder {
        ApplicationBuilder::new(config)
    }

    /// Handles one request. Always produces a response.
    pub async fn handle(&self, mut request: Request) -> Response {
        let path = normalize_path(request.path()).into_owned();
        request.set_path(path);

        match self.router.resolve(request.method(), request.path()) {
            Resolution::NotFound => HyperdriveError::not_found(request.path()).into_response(),
            Resolution::MethodNotAllowed(allowed) => {
                HyperdriveError::method_not_allowed(request.method().clone(), allowed).into_response()
            }
            Resolution::Matched(found) => {
                let route = found.route;
                let params = found.params;
                tracing::trace!(
                    controller = route.controller(),
                    action = route.action(),
                    params = %params,
                    "route matched"
                );

                let pipeline = MiddlewarePipeline::with_container(Arc::clone(&self.container))
                    .pipe_all(self.middleware.iter().cloned())
                    .pipe_all(route.middleware().iter().cloned());

                pipeline
                    .process(request, |request| async move {
                        self.dispatcher.dispatch(route, &params, request).await
                    })
                    .await
            }
        }
    }

    /// The configuration the application was built with.
    #[must_use]
    pub const fn config(&self) -> &HyperdriveConfig {
        &self.config
    }

    /// The service container.
    #[must_use]
    pub const fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// The compiled routes.
    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Names of the registered modules, in registration order.
    #[must_use]
    pub fn modules(&self) -> &[&'static str] {
        &self.modules
    }

    /// Names of the booted providers, in boot order.
    #[must_use]
    pub fn providers(&self) -> &[&'static str] {
        &self.providers
    }

    /// Time from [`Application::builder`] to the end of [`ApplicationBuilder::build`].
    #[must_use]
    pub const fn boot_duration(&self) -> Duration {
        self.boot_duration
    }
}

/// Collects controllers, modules, providers and middleware, then builds an
/// [`Application`].
pub struct ApplicationBuilder {
    started: Instant,
    config: HyperdriveConfig,
    container: Container,
    controllers: Vec<ControllerRegistration>,
    modules: Vec<Box<dyn Module>>,
    providers: ProviderRegistry,
    middleware: Vec<MiddlewareRef>,
}

impl ApplicationBuilder {
    fn new(config: HyperdriveConfig) -> Self {
        let mut container = Container::new();
        container.provide(config.clone());
        container.instance(
            ENVIRONMENT_SERVICE,
            Arc::new(config.app.environment.as_str().to_string()),
        );

        Self {
            started: Instant::now(),
            config,
            container,
            controllers: Vec::new(),
            modules: Vec::new(),
            providers: ProviderRegistry::default(),
            middleware: Vec::new(),
        }
    }

    /// Adds a controller.
    #[must_use]
    pub fn controller<C: Controller>(mut self) -> Self {
        self.controllers.push(ControllerRegistration::of::<C>());
        self
    }

    /// Adds a module and everything it contributes. Duplicates are ignored.
    #[must_use]
    pub fn module<M: Module>(mut self, module: M) -> Self {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            tracing::debug!(module = module.name(), "module already registered");
            return self;
        }

        tracing::debug!(module = module.name(), "registering module");
        module.register(&mut self.container);
        self.controllers.extend(module.controllers());
        for provider in module.providers() {
            self.providers.add(provider, &mut self.container);
        }
        self.middleware.extend(module.middleware());
        self.modules.push(Box::new(module));
        self
    }

    /// Adds a service provider. Duplicates are ignored.
    #[must_use]
    pub fn provider<P: ServiceProvider>(mut self, provider: P) -> Self {
        self.providers.add(Box::new(provider), &mut self.container);
        self
    }

    /// Appends global middleware, run before any route middleware.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    /// Registers services directly.
    #[must_use]
    pub fn configure_container<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut Container),
    {
        configure(&mut self.container);
        self
    }

    /// Compiles routes, boots providers and modules, and checks that every
    /// middleware identifier can be resolved.
    pub fn build(mut self) -> Result<Application, BuildError> {
        let mut collector = RouteCollector::new();
        let mut actions = HashMap::new();
        let mut seen = HashSet::new();

        for registration in &self.controllers {
            if !seen.insert(registration.name()) {
                continue;
            }
            let compiled = registration.install(&mut self.container);
            collector.register_controller(&compiled.declaration)?;
            for entry in compiled.actions {
                Dispatcher::insert(&mut actions, entry)?;
            }
        }

        let providers = self.providers.boot(&mut self.container)?;
        for module in &self.modules {
            module.boot(&self.container).map_err(|source| BuildError::Boot {
                name: module.name().to_string(),
                source,
            })?;
        }

        self.check_middleware(&collector)?;

        let container = Arc::new(self.container);
        let dispatcher = Dispatcher::new(Arc::clone(&container), self.config.routing.expose_error_details)
            .with_actions(actions);
        let router = Router::new(collector);
        let boot_duration = self.started.elapsed();

        tracing::info!(
            app = %self.config.app.name,
            environment = %self.config.app.environment,
            routes = router.len(),
            actions = dispatcher.len(),
            boot_ms = boot_duration.as_secs_f64() * 1000.0,
            "application booted"
        );

        Ok(Application {
            config: self.config,
            container,
            router,
            middleware: self.middleware,
            dispatcher,
            modules: self.modules.iter().map(|m| m.name()).collect(),
            providers,
            boot_duration,
        })
    }

    fn check_middleware(&self, collector: &RouteCollector) -> Result<(), BuildError> {
        for stage in &self.middleware {
            if let MiddlewareRef::Service(id) = stage {
                if !self.container.has(id) {
                    return Err(BuildError::UnknownMiddleware {
                        id: id.to_string(),
                        route: None,
                    });
                }
            }
        }

        for route in collector.get_routes() {
            for id in route.middleware() {
                if !self.container.has(&ServiceId::from(id.clone())) {
                    return Err(BuildError::UnknownMiddleware {
                        id: id.clone(),
                        route: Some(format!("{} {}", route.method(), route.uri())),
                    });
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("config", &self.config)
            .field("controllers", &self.controllers)
            .field("modules", &self.modules.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("providers", &self.providers)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperdrive_config::Environment;
    use http::{Method, StatusCode};

    #[test]
    fn test_core_services_registered() {
        let config = HyperdriveConfig::development();
        let app = Application::builder(config.clone()).build().unwrap();

        let stored = app.container().resolve::<HyperdriveConfig>().unwrap();
        assert_eq!(*stored, config);

        let environment = app
            .container()
            .resolve_id::<String>(&ServiceId::from(ENVIRONMENT_SERVICE))
            .unwrap();
        assert_eq!(environment.as_str(), Environment::Development.as_str());
    }

    #[test]
    fn test_unknown_global_middleware_fails_build() {
        let err = Application::builder(HyperdriveConfig::default())
            .middleware("auth")
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownMiddleware { route: None, .. }));
    }

    #[test]
    fn test_empty_build() {
        let app = Application::builder(HyperdriveConfig::default()).build().unwrap();
        assert!(app.router().is_empty());
        assert!(app.modules().is_empty());
        assert!(app.providers().is_empty());
        assert!(app.boot_duration() < Duration::from_secs(5));
    }

    struct Health;

    impl hyperdrive_core::di::Injectable for Health {
        fn construct(_deps: &mut hyperdrive_core::di::ResolvedDependencies) -> hyperdrive_core::di::ContainerResult<Self> {
            Ok(Self)
        }
    }

    impl Controller for Health {
        fn routes() -> crate::ControllerDefinition<Self> {
            crate::ControllerDefinition::new().action(crate::Action::get(
                "/health",
                "check",
                |_: Arc<Self>, args: crate::Arguments| async move {
                    Ok(args.request("request")?.path().to_string())
                },
            ).param(crate::Param::request("request")))
        }
    }

    #[tokio::test]
    async fn test_middleware_and_actions_see_normalized_path() {
        let app = Application::builder(HyperdriveConfig::default())
            .controller::<Health>()
            .middleware(MiddlewareRef::instance(hyperdrive_middleware::FnMiddleware::new(
                "seen_path",
                |request, next| {
                    Box::pin(async move {
                        let seen = http::HeaderValue::from_str(request.path()).unwrap();
                        next.run(request).await.with_header("x-seen-path", seen)
                    })
                },
            )))
            .build()
            .unwrap();

        let response = app.handle(Request::new(Method::GET, "/health/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("x-seen-path"), Some("/health"));
        assert_eq!(response.payload().as_text(), Some("/health"));
    }

    #[tokio::test]
    async fn test_empty_application_is_404() {
        let app = Application::builder(HyperdriveConfig::default()).build().unwrap();
        let response = app.handle(Request::new(Method::GET, "/missing")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.payload().as_json().unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
