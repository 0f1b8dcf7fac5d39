//! Document Server - wires configuration, persistence and the HTTP API.

use crate::application_service::document_service::DocumentService;
use crate::config::{ServerConfig, StorageBackend};
use crate::infrastructure::persistence::{JsonFileDocumentSink, SledDocumentSink};
use crate::port::persistence::DocumentSink;
use crate::presentation::http_api::{create_router, AppState};
use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

const SLED_DIR_NAME: &str = "documents";
const JSON_FILE_NAME: &str = "documents.json";

/// Open the configured persistence sink under the data directory.
pub fn open_sink(config: &ServerConfig) -> Result<Arc<dyn DocumentSink>> {
    std::fs::create_dir_all(&config.data_dir).context("Failed to create data directory")?;

    let sink: Arc<dyn DocumentSink> = match config.storage {
        StorageBackend::Sled => Arc::new(
            SledDocumentSink::open(config.data_dir.join(SLED_DIR_NAME))
                .context("Failed to open document store")?,
        ),
        StorageBackend::Json => {
            Arc::new(JsonFileDocumentSink::new(config.data_dir.join(JSON_FILE_NAME)))
        }
    };
    Ok(sink)
}

/// Document server instance.
///
/// The collection is loaded once here and lives inside the service until the
/// server is dropped.
pub struct DocumentServer {
    config: ServerConfig,
    service: AppState,
}

impl DocumentServer {
    /// Create a new DocumentServer with the given configuration.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let sink = open_sink(&config)?;
        Self::with_sink(config, sink).await
    }

    /// Create a server over an explicit sink.
    pub async fn with_sink(config: ServerConfig, sink: Arc<dyn DocumentSink>) -> Result<Self> {
        if config.uses_default_token() {
            tracing::warn!("Using the default shared token; set one in the config or environment");
        }

        let service = DocumentService::load(sink, config.shared_secret())
            .await
            .context("Failed to load documents")?;

        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> &AppState {
        &self.service
    }

    /// Run the HTTP server until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .context("Failed to bind HTTP listener")?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves, then
    /// flush the sink.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener
            .local_addr()
            .context("Failed to read listener address")?;
        tracing::info!("Document server listening on http://{}", addr);

        let router = create_router(self.service.clone());
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;

        tracing::info!("Shutting down, flushing documents");
        self.service.flush().await.context("Failed to flush documents")?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
