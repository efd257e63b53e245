//! # HTTP Server Module
//!
//! Serves one or more stores over HTTP, each under its own path prefix.
//!
//! # Endpoints
//!
//! - `/health` - Health check and mounted collections
//! - `/<collection>/*` - Translator routes for one store

pub mod config;
pub mod errors;
pub mod server;

pub use config::{CollectionConfig, CollectionKeyKind, HttpServerConfig};
pub use errors::{ServerError, ServerResult};
pub use server::{HealthResponse, HttpServer, HttpServerBuilder};
