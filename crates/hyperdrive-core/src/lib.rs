//! # Hyperdrive Core
//!
//! Core types for the Hyperdrive framework.
//!
//! This crate provides the foundational types used throughout Hyperdrive:
//!
//! - [`Request`] - One inbound HTTP call, with a middleware-writable attribute bag
//! - [`Response`] - Status, headers and a [`Payload`]; mutators return copies
//! - [`ActionResult`] - What a controller action returns, before normalization
//! - [`HyperdriveError`] - Standard error type with HTTP status mapping
//! - [`di::Container`] - Dependency injection container

#![doc(html_root_url = "https://docs.rs/hyperdrive-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
pub mod di;
mod error;
mod request;
mod response;

pub use action::{ActionResult, IntoActionResult, Json};
pub use error::{
    ErrorCategory, FieldErrors, HyperdriveError, HyperdriveResult,
};
pub use request::Request;
pub use response::{Payload, Response};
