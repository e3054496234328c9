//! Dependency injection container.
//!
//! Services are registered at application startup and resolved by
//! [`ServiceId`]. A service is produced by one of:
//!
//! - a stored instance ([`Container::instance`], [`Container::provide`]),
//! - a binding to another identifier or a factory ([`Container::bind`],
//!   [`Container::singleton`]),
//! - auto-wiring a type that implements [`Injectable`] ([`Container::register`]).
//!
//! # Example
//!
//! ```rust
//! use hyperdrive_core::di::{Container, ContainerResult, Dependency, Injectable, ResolvedDependencies};
//! use std::sync::Arc;
//!
//! struct Config {
//!     database_url: String,
//! }
//!
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! impl Injectable for Database {
//!     fn dependencies() -> Vec<Dependency> {
//!         vec![Dependency::service::<Config>("config")]
//!     }
//!
//!     fn construct(deps: &mut ResolvedDependencies) -> ContainerResult<Self> {
//!         Ok(Self { config: deps.take("config")? })
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.provide(Config { database_url: "postgres://localhost/db".into() });
//! container.register::<Database>();
//!
//! let db = container.resolve::<Database>().unwrap();
//! assert_eq!(db.config.database_url, "postgres://localhost/db");
//! ```

mod container;
mod descriptor;
mod error;
mod id;
mod resolver;

pub use container::{Concrete, Container, Factory, DEFAULT_MAX_DEPTH};
pub use descriptor::{Dependency, Injectable, Instance, ResolvedDependencies};
pub use error::{ContainerError, ContainerResult};
pub use id::ServiceId;
pub use resolver::Resolver;
