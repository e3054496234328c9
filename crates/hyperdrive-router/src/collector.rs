//! Turning controller declarations into a flat route list.

use http::Method;

use crate::error::RouteResult;
use crate::route::Route;

/// The routing metadata of one controller.
///
/// # Example
///
/// ```rust
/// use hyperdrive_router::{ActionDeclaration, ControllerDeclaration, RouteCollector};
/// use http::Method;
///
/// let users = ControllerDeclaration::new("UserController")
///     .prefix("/users")
///     .middleware("auth")
///     .action(ActionDeclaration::new(Method::GET, "/", "index"))
///     .action(ActionDeclaration::new(Method::GET, "/{id}", "show").name("users.show"));
///
/// let mut collector = RouteCollector::new();
/// collector.register_controller(&users).unwrap();
///
/// let uris: Vec<_> = collector.get_routes().iter().map(|r| r.uri()).collect();
/// assert_eq!(uris, ["/users", "/users/{id}"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ControllerDeclaration {
    controller: String,
    prefix: String,
    middleware: Vec<String>,
    actions: Vec<ActionDeclaration>,
}

impl ControllerDeclaration {
    /// Starts a declaration for the controller identified by `controller`.
    pub fn new(controller: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            ..Self::default()
        }
    }

    /// Sets the class-level path prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Appends a class-level middleware identifier.
    #[must_use]
    pub fn middleware(mut self, id: impl Into<String>) -> Self {
        self.middleware.push(id.into());
        self
    }

    /// Appends an action.
    #[must_use]
    pub fn action(mut self, action: ActionDeclaration) -> Self {
        self.actions.push(action);
        self
    }

    /// Appends an action in place.
    pub fn push_action(&mut self, action: ActionDeclaration) {
        self.actions.push(action);
    }

    /// The controller identifier.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// The class-level prefix.
    pub fn path_prefix(&self) -> &str {
        &self.prefix
    }

    /// Class-level middleware.
    pub fn class_middleware(&self) -> &[String] {
        &self.middleware
    }

    /// Declared actions.
    pub fn actions(&self) -> &[ActionDeclaration] {
        &self.actions
    }
}

/// One routed action of a controller.
#[derive(Debug, Clone)]
pub struct ActionDeclaration {
    method: Method,
    path: String,
    action: String,
    name: Option<String>,
    middleware: Vec<String>,
}

impl ActionDeclaration {
    /// Declares `action` for `method` on the path relative to the prefix.
    pub fn new(method: Method, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            action: action.into(),
            name: None,
            middleware: Vec::new(),
        }
    }

    /// Sets the symbolic name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a method-level middleware identifier.
    #[must_use]
    pub fn middleware(mut self, id: impl Into<String>) -> Self {
        self.middleware.push(id.into());
        self
    }

    /// The HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The action name.
    pub fn action_name(&self) -> &str {
        &self.action
    }
}

/// Accumulates routes in registration order.
///
/// Order is significant: when two routes for the same method both match a
/// path, the one registered first wins.
#[derive(Debug, Clone, Default)]
pub struct RouteCollector {
    routes: Vec<Route>,
}

impl RouteCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one route per declared action of `controller`.
    ///
    /// Each route's middleware is the controller's list followed by the
    /// action's own. Nothing is appended if any action fails to compile.
    pub fn register_controller(&mut self, controller: &ControllerDeclaration) -> RouteResult<&mut Self> {
        let mut routes = Vec::with_capacity(controller.actions.len());

        for action in &controller.actions {
            let uri = build_uri(&controller.prefix, &action.path);
            let middleware = controller
                .middleware
                .iter()
                .chain(&action.middleware)
                .cloned()
                .collect();

            let mut route = Route::new(
                action.method.clone(),
                &uri,
                controller.controller.as_str(),
                action.action.as_str(),
            )?
            .with_middleware(middleware);
            if let Some(name) = &action.name {
                route = route.with_name(name.as_str());
            }

            tracing::debug!(
                method = %route.method(),
                uri = route.uri(),
                controller = route.controller(),
                action = route.action(),
                "route registered"
            );
            routes.push(route);
        }

        self.routes.extend(routes);
        Ok(self)
    }

    /// Registers several controllers in order.
    pub fn register_controllers<'a, I>(&mut self, controllers: I) -> RouteResult<&mut Self>
    where
        I: IntoIterator<Item = &'a ControllerDeclaration>,
    {
        for controller in controllers {
            self.register_controller(controller)?;
        }
        Ok(self)
    }

    /// Appends a single, already built route.
    pub fn add_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// All routes in registration order.
    pub fn get_routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes for `method`, in registration order.
    pub fn get_routes_by_method(&self, method: &Method) -> Vec<&Route> {
        self.routes.iter().filter(|r| r.method() == method).collect()
    }

    /// The first route registered under `name`.
    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name() == Some(name))
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Consumes the collector, returning the routes.
    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

/// Joins a prefix and a path with exactly one `/`.
///
/// Both sides are trimmed of slashes independently; an empty side drops out
/// and two empty sides give `/`.
///
/// ```rust
/// use hyperdrive_router::build_uri;
///
/// assert_eq!(build_uri("/api/", "/users/"), "/api/users");
/// assert_eq!(build_uri("", "users"), "/users");
/// assert_eq!(build_uri("api", ""), "/api");
/// assert_eq!(build_uri("/", "/"), "/");
/// ```
pub fn build_uri(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_matches('/');

    match (prefix.is_empty(), path.is_empty()) {
        (false, false) => format!("/{prefix}/{path}"),
        (false, true) => format!("/{prefix}"),
        (true, false) => format!("/{path}"),
        (true, true) => "/".to_string(),
    }
}
