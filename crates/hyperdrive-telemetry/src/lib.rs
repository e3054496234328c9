//! Logging setup for Hyperdrive applications.
//!
//! Every Hyperdrive crate logs through `tracing` macros; this crate installs
//! the subscriber that writes those events out, as JSON lines in production
//! or pretty-printed during development.
//!
//! | Source                 | Level           | Events                               |
//! |------------------------|-----------------|--------------------------------------|
//! | container              | `debug`/`trace` | registrations, resolutions           |
//! | router                 | `debug`         | route registration, 404/405 outcomes |
//! | extract                | `info`          | DTO validation failures              |
//! | dispatcher             | `error`         | failed actions                       |
//! | access log middleware  | `info`/`warn`   | one event per request                |
//!
//! The per-request field names are documented on the access log middleware.

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogOutput};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
