//! Route records.

use http::Method;

use crate::error::{RouteError, RouteResult};
use crate::params::Params;
use crate::pattern::RoutePattern;
use crate::router::normalize_path;

/// Methods a route can be declared for.
pub const ROUTE_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// One registered route.
///
/// Created at boot, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    uri: String,
    controller: String,
    action: String,
    name: Option<String>,
    middleware: Vec<String>,
    pattern: RoutePattern,
}

impl Route {
    /// Creates a route and compiles its template.
    ///
    /// A trailing `/` on the template is dropped, except for the root.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hyperdrive_router::Route;
    /// use http::Method;
    ///
    /// let route = Route::new(Method::GET, "/users/{id}/", "UserController", "show").unwrap();
    /// assert_eq!(route.uri(), "/users/{id}");
    /// assert_eq!(route.matches("/users/7").unwrap().get("id"), Some("7"));
    /// ```
    pub fn new(
        method: Method,
        uri: &str,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> RouteResult<Self> {
        if !ROUTE_METHODS.contains(&method) {
            return Err(RouteError::UnsupportedMethod(method));
        }

        let uri = if uri.starts_with('/') {
            normalize_path(uri).into_owned()
        } else {
            normalize_path(&format!("/{uri}")).into_owned()
        };
        let pattern = RoutePattern::compile(&uri)?;

        Ok(Self {
            method,
            uri,
            controller: controller.into(),
            action: action.into(),
            name: None,
            middleware: Vec::new(),
            pattern,
        })
    }

    /// Sets the symbolic name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the middleware identifiers, outermost first.
    #[must_use]
    pub fn with_middleware(mut self, middleware: Vec<String>) -> Self {
        self.middleware = middleware;
        self
    }

    /// The HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The URI template.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Identifier of the owning controller.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Name of the target action.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The symbolic name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Middleware identifiers, class-level ones first.
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    /// The compiled template.
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Matches a normalized path against the template.
    pub fn matches(&self, path: &str) -> Option<Params> {
        self.pattern.captures(path)
    }
}
