//! Web API module for mediabox.
//!
//! This module provides the JSON API used by the browser client, plus
//! health check, Swagger UI and optional static file serving.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
