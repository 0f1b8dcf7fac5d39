//! Sled-based persistent document sink implementation.

use crate::domain::document::Document;
use crate::port::persistence::DocumentSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sled::{Db, IVec};
use std::path::Path;

const DOCUMENT_TREE_NAME: &str = "documents";
const COLLECTION_KEY: &[u8] = b"collection";

/// Sled-based implementation of DocumentSink.
///
/// The whole collection is stored as one JSON value under a fixed key, so a
/// write either replaces the previous collection or leaves it intact.
pub struct SledDocumentSink {
    db: Db,
}

impl SledDocumentSink {
    /// Open or create a sled database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref()).context("Failed to open sled database")?;
        Ok(Self { db })
    }

    fn documents_tree(&self) -> Result<sled::Tree> {
        self.db
            .open_tree(DOCUMENT_TREE_NAME)
            .context("Failed to open documents tree")
    }
}

/// Put back the collection that was stored before a write that could not be
/// flushed, so the background flusher does not persist it later.
fn restore_previous(tree: &sled::Tree, previous: Option<IVec>) -> Result<()> {
    match previous {
        Some(value) => tree.insert(COLLECTION_KEY, value).map(|_| ()),
        None => tree.remove(COLLECTION_KEY).map(|_| ()),
    }
    .context("Failed to restore previous documents")
}

#[async_trait]
impl DocumentSink for SledDocumentSink {
    async fn load_documents(&self) -> Result<Vec<Document>> {
        let tree = self.documents_tree()?;
        match tree.get(COLLECTION_KEY)? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).context("Failed to deserialize documents")
            }
            None => Ok(Vec::new()),
        }
    }

    async fn persist_documents(&self, documents: &[Document]) -> Result<()> {
        let tree = self.documents_tree()?;
        let value = serde_json::to_vec(documents).context("Failed to serialize documents")?;
        let previous = tree
            .insert(COLLECTION_KEY, value)
            .context("Failed to store documents")?;

        if let Err(e) = tree.flush_async().await {
            if let Err(restore_err) = restore_previous(&tree, previous) {
                tracing::error!("{:#}", restore_err);
            }
            return Err(e).context("Failed to flush documents tree");
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.db.flush_async().await.context("Failed to flush database")?;
        Ok(())
    }
}
