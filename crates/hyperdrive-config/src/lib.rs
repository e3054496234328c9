//! Application settings.
//!
//! A [`HyperdriveConfig`] has four sections: [`AppConfig`] (name,
//! environment, debug), [`ServerConfig`] (for whatever server hosts the
//! application), [`LoggingConfig`] and [`RoutingConfig`]. [`ConfigLoader`]
//! layers a preset, then files, then `.env`, then the process environment.
//! Unknown keys are rejected at every layer.
//!
//! # Example
//!
//! ```no_run
//! use hyperdrive_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hyperdrive_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("hyperdrive.toml")?
//!     .with_dotenv(".env")?
//!     .with_env_prefix("HYPERDRIVE")
//!     .load()?;
//!
//! println!("Running {} in {}", config.app.name, config.app.environment);
//! # Ok(())
//! # }
//! ```
//!
//! # File layout
//!
//! ```toml
//! [app]
//! name = "orders"
//! environment = "production"
//! debug = false
//!
//! [server]
//! http_addr = "0.0.0.0:8080"
//! request_timeout_ms = 30000
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//!
//! [routing]
//! expose_error_details = false
//! ```
//!
//! # Overrides
//!
//! Variables are named `PREFIX__SECTION__KEY`:
//!
//! - `HYPERDRIVE__APP__ENVIRONMENT=development`
//! - `HYPERDRIVE__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `HYPERDRIVE__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::*;
