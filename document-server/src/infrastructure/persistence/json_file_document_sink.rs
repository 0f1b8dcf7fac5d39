//! JSON file document sink.

use crate::domain::document::Document;
use crate::port::persistence::DocumentSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Stores the collection as a pretty-printed JSON array in a single file.
///
/// Writes go to a sibling temporary file that is synced and then renamed over
/// the target, so readers never observe a half-written collection and a
/// successful persist survives a crash.
pub struct JsonFileDocumentSink {
    path: PathBuf,
}

impl JsonFileDocumentSink {
    /// Use `path` as the collection file. Parent directories are created on
    /// first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentSink for JsonFileDocumentSink {
    async fn load_documents(&self) -> Result<Vec<Document>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    async fn persist_documents(&self, documents: &[Document]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create data directory")?;
        }

        let value =
            serde_json::to_vec_pretty(documents).context("Failed to serialize documents")?;
        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(&value)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync {}", temp_path.display()))?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        sync_parent_dir(&self.path).await
    }

    async fn flush(&self) -> Result<()> {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open {}", self.path.display()))
            }
        };
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync {}", self.path.display()))
    }
}

/// Make the rename itself durable.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let dir = File::open(parent)
        .await
        .with_context(|| format!("Failed to open {}", parent.display()))?;
    dir.sync_all()
        .await
        .with_context(|| format!("Failed to sync {}", parent.display()))
}

// Directory handles cannot be synced here.
#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}
