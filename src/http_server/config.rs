//! HTTP Server Configuration
//!
//! Bind address, CORS origins, log filter and the collections to serve,
//! loaded from a JSON file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ServerError, ServerResult};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 7070)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins (default: none, i.e. any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// `tracing` filter directive (default: "info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Collections served under `/<name>`
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

/// Key type of a configured collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKeyKind {
    Text,
    Integer,
}

/// One collection backed by an in-memory store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Mount name, also the entity name
    pub name: String,

    /// Field holding each entity's key (default: "id")
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Key type (default: text)
    #[serde(default = "default_key_kind")]
    pub key_kind: CollectionKeyKind,

    /// Recognized field names
    pub fields: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7070
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_key_field() -> String {
    "id".to_string()
}

fn default_key_kind() -> CollectionKeyKind {
    CollectionKeyKind::Text
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            log_filter: default_log_filter(),
            collections: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    /// Override the listening port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ServerResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("Failed to read config: {}", e)))?;

        let config: HttpServerConfig = serde_json::from_str(&content)
            .map_err(|e| ServerError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate collection definitions
    pub fn validate(&self) -> ServerResult<()> {
        let mut names = HashSet::new();

        for collection in &self.collections {
            if collection.name.is_empty() || collection.name.starts_with('_') {
                return Err(ServerError::Config(format!(
                    "Invalid collection name: '{}'",
                    collection.name
                )));
            }

            if !names.insert(collection.name.as_str()) {
                return Err(ServerError::DuplicateCollection(collection.name.clone()));
            }

            if !collection.fields.contains(&collection.key_field) {
                return Err(ServerError::Config(format!(
                    "Key field '{}' of collection '{}' is not among its fields",
                    collection.key_field, collection.name
                )));
            }
        }

        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
