//! # HTTP Server Module
//!
//! Axum front door for the relay.
//!
//! # Endpoints
//!
//! - `{relay_path}` (default `/`) - Relay endpoint, any method
//! - `/health` - Health check
//! - `/metrics` - Counter snapshot

pub mod config;
pub mod observability_routes;
pub mod relay_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
