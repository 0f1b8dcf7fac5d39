//! Document server binary entry point.

use anyhow::{Context, Result};
use clap::Parser;
use document_server::config::{ServerConfig, StorageBackend};
use document_server::DocumentServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Document server CLI arguments.
///
/// Flags override values from the config file.
#[derive(Parser, Debug)]
#[command(name = "document-server")]
#[command(about = "Stores documents sent over HTTP and persists them")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory for persistence.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// HTTP API listen address.
    #[arg(short = 'l', long)]
    listen: Option<SocketAddr>,

    /// Storage backend.
    #[arg(short, long, value_enum)]
    storage: Option<StorageBackend>,

    /// Shared token required by update requests.
    #[arg(long, env = "DOCUMENT_SERVER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(token) = self.token {
            config.token = token;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = args.into_config()?;

    tracing::info!("Starting document server");
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("Storage backend: {:?}", config.storage);

    let server = DocumentServer::new(config)
        .await
        .context("Failed to create document server")?;

    server.run().await?;

    Ok(())
}
