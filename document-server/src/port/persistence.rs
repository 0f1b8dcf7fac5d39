//! Persistence traits - Abstract interface for the document sink

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::document::Document;

/// Durable storage for the document collection.
///
/// The collection is always written as a whole; implementations replace
/// whatever they stored previously.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Load the stored collection. An empty store yields an empty collection.
    async fn load_documents(&self) -> Result<Vec<Document>>;

    /// Durably replace the stored collection with `documents`.
    async fn persist_documents(&self, documents: &[Document]) -> Result<()>;

    /// Flush pending writes to disk.
    async fn flush(&self) -> Result<()>;
}
