//! Test utilities and mock implementations for unit testing.

use crate::domain::document::Document;
use crate::port::persistence::DocumentSink;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// MockDocumentSink
// ============================================================================

/// In-memory DocumentSink that records every write.
#[derive(Default)]
pub struct MockDocumentSink {
    pub initial: Vec<Document>,
    pub writes: Arc<Mutex<Vec<Vec<Document>>>>,
    pub failing: AtomicBool,
}

impl MockDocumentSink {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            initial: documents,
            ..Self::default()
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub async fn persist_count(&self) -> usize {
        self.writes.lock().await.len()
    }

    pub async fn last_persisted(&self) -> Option<Vec<Document>> {
        self.writes.lock().await.last().cloned()
    }
}

#[async_trait]
impl DocumentSink for MockDocumentSink {
    async fn load_documents(&self) -> Result<Vec<Document>> {
        Ok(self.initial.clone())
    }

    async fn persist_documents(&self, documents: &[Document]) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("mock sink write failure");
        }
        self.writes.lock().await.push(documents.to_vec());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
