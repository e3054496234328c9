//! Matching requests against registered routes.

use std::borrow::Cow;
use std::collections::HashMap;

use http::Method;

use crate::collector::RouteCollector;
use crate::params::Params;
use crate::route::Route;
use crate::RouteMatch;

/// Outcome of looking up a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A route matched.
    Matched(RouteMatch<'a>),
    /// The path matched routes, but none for this method.
    MethodNotAllowed(Vec<Method>),
    /// Nothing matched the path.
    NotFound,
}

/// A linear, registration-ordered route matcher.
///
/// Routes are grouped by method but otherwise tried in the order they were
/// registered, and the first match wins. Matching is pure: the same input
/// against the same route set always gives the same result.
///
/// # Example
///
/// ```rust
/// use hyperdrive_router::{Route, RouteCollector, Router};
/// use http::Method;
///
/// let mut collector = RouteCollector::new();
/// collector.add_route(Route::new(Method::GET, "/users/{id}", "UserController", "show").unwrap());
/// let router = Router::new(collector);
///
/// let m = router.match_route(&Method::GET, "/users/42").unwrap();
/// assert_eq!(m.route.action(), "show");
/// assert_eq!(m.params.get("id"), Some("42"));
///
/// assert!(router.match_route(&Method::GET, "/missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
    by_method: HashMap<Method, Vec<usize>>,
}

impl Router {
    /// Builds a router from everything the collector gathered.
    #[must_use]
    pub fn new(collector: RouteCollector) -> Self {
        Self::from_routes(collector.into_routes())
    }

    /// Builds a router from a route list, keeping its order.
    #[must_use]
    pub fn from_routes(routes: Vec<Route>) -> Self {
        let mut by_method: HashMap<Method, Vec<usize>> = HashMap::new();
        for (index, route) in routes.iter().enumerate() {
            by_method.entry(route.method().clone()).or_default().push(index);
        }
        Self { routes, by_method }
    }

    /// Finds the first route for `method` whose template matches `path`.
    ///
    /// The path is normalized first (see [`normalize_path`]).
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let path = normalize_path(path);
        self.by_method
            .get(method)?
            .iter()
            .map(|&index| &self.routes[index])
            .find_map(|route| route.matches(&path).map(|params| RouteMatch::new(route, params)))
    }

    /// Methods with at least one route matching `path`, in registration order.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let path = normalize_path(path);
        let mut methods: Vec<Method> = Vec::new();
        for route in &self.routes {
            if !methods.contains(route.method()) && route.pattern().is_match(&path) {
                methods.push(route.method().clone());
            }
        }
        methods
    }

    /// Matches and, on a miss, tells a 404 apart from a 405.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        if let Some(found) = self.match_route(method, path) {
            return Resolution::Matched(found);
        }

        let allowed = self.allowed_methods(path);
        if allowed.is_empty() {
            tracing::debug!(%method, path, "no route matched");
            Resolution::NotFound
        } else {
            tracing::debug!(%method, path, ?allowed, "method not allowed");
            Resolution::MethodNotAllowed(allowed)
        }
    }

    /// All routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The first route registered under `name`.
    #[must_use]
    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name() == Some(name))
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Strips exactly one trailing `/`, unless the path is `/` itself.
///
/// ```rust
/// use hyperdrive_router::normalize_path;
///
/// assert_eq!(normalize_path("/users/"), "/users");
/// assert_eq!(normalize_path("/users//"), "/users/");
/// assert_eq!(normalize_path("/"), "/");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.is_empty() {
        return Cow::Borrowed("/");
    }
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => Cow::Borrowed(stripped),
        _ => Cow::Borrowed(path),
    }
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(route: &'a Route, params: Params) -> Self {
        Self { route, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: Method, uri: &str, action: &str) -> Route {
        Route::new(method, uri, "TestController", action).unwrap()
    }

    fn router(routes: Vec<Route>) -> Router {
        Router::from_routes(routes)
    }

    #[test]
    fn test_router_new() {
        let router = Router::default();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_match_static_and_param() {
        let router = router(vec![
            route(Method::GET, "/users", "index"),
            route(Method::GET, "/users/{id}", "show"),
        ]);

        let m = router.match_route(&Method::GET, "/users").unwrap();
        assert_eq!(m.route.action(), "index");
        assert!(m.params.is_empty());

        let m = router.match_route(&Method::GET, "/users/123").unwrap();
        assert_eq!(m.route.action(), "show");
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_first_registered_wins() {
        let router = router(vec![
            route(Method::GET, "/users/{id}", "show"),
            route(Method::GET, "/users/me", "me"),
        ]);

        let m = router.match_route(&Method::GET, "/users/me").unwrap();
        assert_eq!(m.route.action(), "show");
        assert_eq!(m.params.get("id"), Some("me"));
    }

    #[test]
    fn test_method_must_match() {
        let router = router(vec![route(Method::GET, "/users", "index")]);
        assert!(router.match_route(&Method::POST, "/users").is_none());
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let router = router(vec![
            route(Method::GET, "/", "home"),
            route(Method::GET, "/users", "index"),
        ]);

        assert_eq!(router.match_route(&Method::GET, "/users/").unwrap().route.action(), "index");
        assert_eq!(router.match_route(&Method::GET, "/").unwrap().route.action(), "home");
        assert!(router.match_route(&Method::GET, "/users//").is_none());
    }

    #[test]
    fn test_resolve_distinguishes_404_and_405() {
        let router = router(vec![
            route(Method::GET, "/users/{id}", "show"),
            route(Method::DELETE, "/users/{id}", "destroy"),
            route(Method::GET, "/users/{id}", "duplicate"),
        ]);

        assert!(matches!(
            router.resolve(&Method::GET, "/users/1"),
            Resolution::Matched(m) if m.route.action() == "show"
        ));
        assert_eq!(
            router.resolve(&Method::PUT, "/users/1"),
            Resolution::MethodNotAllowed(vec![Method::GET, Method::DELETE])
        );
        assert_eq!(router.resolve(&Method::GET, "/posts"), Resolution::NotFound);
    }

    #[test]
    fn test_matching_is_idempotent() {
        let router = router(vec![route(Method::GET, "/a/{x}", "a")]);
        let first = router.match_route(&Method::GET, "/a/1");
        let second = router.match_route(&Method::GET, "/a/1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_route_by_name() {
        let router = router(vec![route(Method::GET, "/users", "index").with_name("users.index")]);
        assert_eq!(router.route_by_name("users.index").map(Route::action), Some("index"));
    }
}
