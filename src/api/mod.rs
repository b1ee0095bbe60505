//! HTTP control API for the panel using Actix Web.
//!
//! This module exposes the panel's operations over a small REST-like API
//! built on the Actix Web framework: listing servers, creating and deleting
//! them, starting and stopping their processes, reading status and console
//! logs, and running one-off commands.
//!
//! The API handles HTTP routing, bearer-token authentication, and CORS.
//! It is optional: it only starts when an `api` block is present in the
//! panel configuration, and it is controlled through the returned
//! [`ApiHandle`].

// Re-export the main types
pub use self::server::{ApiHandle, ApiServer};
pub use self::types::{ApiMessage, CreateServerRequest, ServerSummary, StatusResponse};

// Submodules
pub mod actix_error;
pub mod auth;
pub mod handlers;
pub mod server;
pub mod types;
