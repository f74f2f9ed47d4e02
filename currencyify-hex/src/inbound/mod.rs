//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod handlers;
mod server;

pub use handlers::{AppState, ErrorBody};
pub use server::{CONVERT_PATH, EXCHANGE_RATE_PATH, HEALTHCHECK_PATH, HttpServer};
