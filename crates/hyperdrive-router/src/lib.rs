//! Route collection and matching for Hyperdrive.
//!
//! Controllers describe their routes with a [`ControllerDeclaration`]; a
//! [`RouteCollector`] flattens those into [`Route`] records, and a [`Router`]
//! matches `(method, path)` pairs against them.
//!
//! # Features
//!
//! - **Registration-ordered matching**: the first route registered wins
//! - **Path parameters**: `{name}` placeholders capture one path segment
//! - **Compile-time errors at boot**: bad templates fail on registration
//! - **404 vs 405**: [`Router::resolve`] reports the methods a path allows
//!
//! # Example
//!
//! ```rust
//! use hyperdrive_router::{ActionDeclaration, ControllerDeclaration, RouteCollector, Router};
//! use http::Method;
//!
//! let mut collector = RouteCollector::new();
//! collector
//!     .register_controller(
//!         &ControllerDeclaration::new("UserController")
//!             .prefix("/users")
//!             .action(ActionDeclaration::new(Method::GET, "/", "index"))
//!             .action(ActionDeclaration::new(Method::GET, "/{id}", "show")),
//!     )
//!     .unwrap();
//!
//! let router = Router::new(collector);
//! let route_match = router.match_route(&Method::GET, "/users/123").unwrap();
//! assert_eq!(route_match.route.action(), "show");
//! assert_eq!(route_match.params.get("id"), Some("123"));
//! ```

mod collector;
mod error;
mod params;
mod pattern;
mod route;
mod router;

pub use collector::{build_uri, ActionDeclaration, ControllerDeclaration, RouteCollector};
pub use error::{RouteError, RouteResult};
pub use params::Params;
pub use pattern::RoutePattern;
pub use route::{Route, ROUTE_METHODS};
pub use router::{normalize_path, Resolution, Router};

/// A matched route with its extracted parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The matched route
    pub route: &'a Route,
    /// Captured path parameters
    pub params: Params,
}

impl PartialEq for RouteMatch<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.route, other.route) && self.params == other.params
    }
}

impl Eq for RouteMatch<'_> {}
