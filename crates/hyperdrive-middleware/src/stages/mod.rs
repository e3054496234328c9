//! Built-in middleware stages.
//!
//! - [`request_id`] assigns a UUID v7 to every request
//! - [`access_log`] emits one structured log event per request
//!
//! Neither is installed automatically; pipe them like any other middleware.

pub mod access_log;
pub mod request_id;

pub use access_log::AccessLogMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_ATTRIBUTE, REQUEST_ID_HEADER};
