//! # HTTP Server
//!
//! Mounts one translator router per registered store and serves them with
//! a health check, CORS and request tracing.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rest_api::{store_routes, RequestTranslator, TOTAL_HEADER};
use crate::store::Store;

use super::config::HttpServerConfig;
use super::errors::{ServerError, ServerResult};

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub collections: Vec<String>,
}

/// Collects store routers before the server is built
pub struct HttpServerBuilder {
    config: HttpServerConfig,
    router: Router,
    collections: BTreeSet<String>,
}

impl HttpServerBuilder {
    fn new(config: HttpServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            collections: BTreeSet::new(),
        }
    }

    /// Serve `store` under `/<name>`
    pub fn mount<S: Store>(mut self, name: &str, store: Arc<S>) -> ServerResult<Self> {
        if self.collections.contains(name) {
            return Err(ServerError::DuplicateCollection(name.to_string()));
        }

        let translator = RequestTranslator::new(store).map_err(|source| {
            ServerError::Registration {
                name: name.to_string(),
                source,
            }
        })?;

        self.router = self
            .router
            .nest(&format!("/{}", name), store_routes(translator));
        self.collections.insert(name.to_string());
        Ok(self)
    }

    /// Names mounted so far
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(String::as_str)
    }

    /// Finish the router
    pub fn build(self) -> HttpServer {
        let health = HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            collections: self.collections.into_iter().collect(),
        };

        let router = self
            .router
            .route("/health", get(move || health_handler(health.clone())))
            .layer(cors_layer(&self.config))
            .layer(TraceLayer::new_for_http());

        HttpServer {
            config: self.config,
            router,
        }
    }
}

/// Configure CORS from config
fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        // No origins configured: permissive
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([TOTAL_HEADER])
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([TOTAL_HEADER])
    }
}

async fn health_handler(health: HealthResponse) -> impl IntoResponse {
    (StatusCode::OK, Json(health))
}

/// HTTP server over the mounted collections
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Start collecting stores to serve
    pub fn builder(config: HttpServerConfig) -> HttpServerBuilder {
        HttpServerBuilder::new(config)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until ctrl-c
    pub async fn start(self) -> ServerResult<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.config.socket_addr()))?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "storegate listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("storegate stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until the process is killed
        std::future::pending::<()>().await;
    }
}
