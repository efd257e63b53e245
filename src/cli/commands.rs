//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::http_server::{
    CollectionConfig, CollectionKeyKind, HttpServer, HttpServerConfig, ServerResult,
};
use crate::store::{FieldSet, MemoryStore};

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Dispatch one command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Check { config } => check(&config),
    }
}

/// Load and validate a config file, reporting what it would serve
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = HttpServerConfig::load(config_path)?;

    println!("Configuration OK: {}", config_path.display());
    for collection in &config.collections {
        println!(
            "  /{} ({} key '{}', {} fields)",
            collection.name,
            key_kind_name(collection.key_kind),
            collection.key_field,
            collection.fields.len()
        );
    }
    Ok(())
}

/// Serve the configured collections until ctrl-c
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = HttpServerConfig::load(config_path)?;
    if let Some(port) = port {
        config = config.with_port(port);
    }

    init_tracing(&config.log_filter);

    let server = build_server(config)?;

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(server.start())?;

    Ok(())
}

/// Mount an in-memory store for every configured collection
pub fn build_server(config: HttpServerConfig) -> ServerResult<HttpServer> {
    let collections = config.collections.clone();
    let mut builder = HttpServer::builder(config);

    for collection in &collections {
        builder = match collection.key_kind {
            CollectionKeyKind::Text => {
                builder.mount(&collection.name, Arc::new(memory_store::<String>(collection)))?
            }
            CollectionKeyKind::Integer => {
                builder.mount(&collection.name, Arc::new(memory_store::<i64>(collection)))?
            }
        };
        info!(
            collection = %collection.name,
            key_kind = key_kind_name(collection.key_kind),
            "collection mounted"
        );
    }

    Ok(builder.build())
}

fn memory_store<K: crate::store::StoreKey>(collection: &CollectionConfig) -> MemoryStore<Value, K> {
    MemoryStore::new(
        collection.name.clone(),
        collection.key_field.clone(),
        FieldSet::new(collection.fields.iter().cloned()),
    )
}

fn key_kind_name(kind: CollectionKeyKind) -> &'static str {
    match kind {
        CollectionKeyKind::Text => "text",
        CollectionKeyKind::Integer => "integer",
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured filter
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "port": 0,
                "collections": [
                    {"name": "users", "fields": ["id", "name"]},
                    {"name": "orders", "key_field": "no", "key_kind": "integer", "fields": ["no", "total"]}
                ]
            }"#,
        )
        .unwrap();
        file
    }

    #[test]
    fn test_check_accepts_valid_config() {
        let file = create_config();
        assert!(check(file.path()).is_ok());
    }

    #[test]
    fn test_check_missing_file() {
        let err = check(Path::new("/nonexistent/storegate.json")).unwrap_err();
        assert!(err.to_string().starts_with("GATE_CLI_CONFIG_ERROR"));
    }

    #[test]
    fn test_build_server_mounts_collections() {
        let file = create_config();
        let config = HttpServerConfig::load(file.path()).unwrap();
        let server = build_server(config).unwrap();
        assert_eq!(server.socket_addr(), "0.0.0.0:0");
    }
}
