//! Document service - credential check, upsert and persistence.

use crate::domain::credential::SharedSecret;
use crate::domain::document::{Document, DocumentMetadata};
use crate::domain::upsert::{upsert, UpsertOutcome};
use crate::port::persistence::DocumentSink;
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum DocumentServiceError {
    #[error("Token does not match")]
    TokenMismatch,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to persist documents")]
    Persistence(#[source] anyhow::Error),
}

/// Input of a document upsert.
///
/// Every field is optional so a request with a bad token is rejected as such
/// regardless of what else it is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDocumentCommand {
    pub token: Option<String>,
    pub id: Option<String>,
    pub file_name: Option<String>,
    pub content: Option<String>,
}

impl UpdateDocumentCommand {
    /// Build the incoming document. Only meaningful once the token passed.
    fn into_document(self) -> Result<Document, DocumentServiceError> {
        let id = required(self.id, "id")?;
        if id.is_empty() {
            return Err(DocumentServiceError::InvalidRequest(
                "document id must not be empty".to_string(),
            ));
        }
        let file_name = required(self.file_name, "fileName")?;
        let content = required(self.content, "content")?;
        Ok(Document::new(id, file_name, content))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, DocumentServiceError> {
    value.ok_or_else(|| DocumentServiceError::InvalidRequest(format!("missing field {}", field)))
}

/// Owns the document collection for the lifetime of the server.
///
/// Every mutation runs under one lock from the upsert until the sink write
/// returns, so concurrent requests are applied one at a time and the stored
/// collection always matches the in-memory one.
pub struct DocumentService {
    documents: Mutex<Vec<Document>>,
    sink: Arc<dyn DocumentSink>,
    secret: SharedSecret,
}

impl DocumentService {
    /// Create a service over an already loaded collection.
    pub fn new(documents: Vec<Document>, sink: Arc<dyn DocumentSink>, secret: SharedSecret) -> Self {
        Self {
            documents: Mutex::new(documents),
            sink,
            secret,
        }
    }

    /// Create a service whose initial collection is read from `sink`.
    pub async fn load(sink: Arc<dyn DocumentSink>, secret: SharedSecret) -> Result<Self> {
        let documents = sink.load_documents().await?;
        tracing::info!("Loaded {} documents", documents.len());
        Ok(Self::new(documents, sink, secret))
    }

    /// Insert the document or replace every stored document with its id, then
    /// persist the whole collection.
    ///
    /// A failed write restores the collection to its state before the call.
    pub async fn update_document(
        &self,
        command: UpdateDocumentCommand,
    ) -> Result<UpsertOutcome, DocumentServiceError> {
        let authorized = command
            .token
            .as_deref()
            .is_some_and(|token| self.secret.matches(token));
        if !authorized {
            tracing::warn!(
                document_id = command.id.as_deref().unwrap_or_default(),
                "Rejected document update: token mismatch"
            );
            return Err(DocumentServiceError::TokenMismatch);
        }

        let incoming = command.into_document()?;

        let mut documents = self.documents.lock().await;
        let previous = documents.clone();
        let outcome = upsert(incoming, &mut documents);

        if let Err(e) = self.sink.persist_documents(&documents).await {
            *documents = previous;
            tracing::error!("Failed to persist documents: {:#}", e);
            return Err(DocumentServiceError::Persistence(e));
        }

        match &outcome {
            UpsertOutcome::Inserted(file_name) => tracing::info!("added: {}", file_name),
            UpsertOutcome::Updated(file_name) => tracing::info!("updated: {}", file_name),
        }
        Ok(outcome)
    }

    /// Metadata of every document, in collection order.
    pub async fn list_documents(&self) -> Vec<DocumentMetadata> {
        self.documents
            .lock()
            .await
            .iter()
            .map(Document::metadata)
            .collect()
    }

    /// First document with the given id.
    pub async fn get_document(&self, id: &str) -> Option<Document> {
        self.documents
            .lock()
            .await
            .iter()
            .find(|doc| doc.id == id)
            .cloned()
    }

    pub async fn document_count(&self) -> usize {
        self.documents.lock().await.len()
    }

    /// Flush the sink; called on shutdown.
    pub async fn flush(&self) -> Result<()> {
        self.sink.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockDocumentSink;

    const SECRET: &str = "abracadabra";

    fn command(token: &str, id: &str, file_name: &str, content: &str) -> UpdateDocumentCommand {
        UpdateDocumentCommand {
            token: Some(token.to_string()),
            id: Some(id.to_string()),
            file_name: Some(file_name.to_string()),
            content: Some(content.to_string()),
        }
    }

    async fn create_service(initial: Vec<Document>) -> (DocumentService, Arc<MockDocumentSink>) {
        let sink = Arc::new(MockDocumentSink::with_documents(initial));
        let service = DocumentService::load(sink.clone(), SharedSecret::new(SECRET))
            .await
            .unwrap();
        (service, sink)
    }

    #[tokio::test]
    async fn test_load_reads_initial_collection() {
        let (service, _sink) = create_service(vec![Document::new("1", "a.txt", "x")]).await;
        assert_eq!(service.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_into_empty_collection() {
        let (service, sink) = create_service(vec![]).await;

        let outcome = service
            .update_document(command(SECRET, "2", "b.txt", "z"))
            .await
            .unwrap();

        assert_eq!(outcome.message(), "Added: b.txt");
        assert_eq!(
            service.get_document("2").await,
            Some(Document::new("2", "b.txt", "z"))
        );
        assert_eq!(sink.persist_count().await, 1);
        assert_eq!(
            sink.last_persisted().await,
            Some(vec![Document::new("2", "b.txt", "z")])
        );
    }

    #[tokio::test]
    async fn test_update_existing_document() {
        let (service, sink) = create_service(vec![Document::new("1", "a.txt", "x")]).await;

        let outcome = service
            .update_document(command(SECRET, "1", "a-renamed.txt", "y"))
            .await
            .unwrap();

        assert_eq!(outcome.message(), "Updated: a-renamed.txt");
        assert_eq!(
            sink.last_persisted().await,
            Some(vec![Document::new("1", "a-renamed.txt", "y")])
        );
    }

    #[tokio::test]
    async fn test_token_mismatch_does_not_mutate_or_persist() {
        let initial = vec![Document::new("1", "a.txt", "x")];
        let (service, sink) = create_service(initial.clone()).await;

        let err = service
            .update_document(command("wrong", "1", "evil.txt", "y"))
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentServiceError::TokenMismatch));
        assert_eq!(err.to_string(), "Token does not match");
        assert_eq!(service.get_document("1").await, Some(initial[0].clone()));
        assert_eq!(sink.persist_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let (service, sink) = create_service(vec![]).await;

        let err = service
            .update_document(command(SECRET, "", "a.txt", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentServiceError::InvalidRequest(_)));
        assert_eq!(service.document_count().await, 0);
        assert_eq!(sink.persist_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected_after_token() {
        let (service, sink) = create_service(vec![]).await;

        let err = service
            .update_document(UpdateDocumentCommand {
                content: None,
                ..command(SECRET, "1", "a.txt", "x")
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid request: missing field content");
        assert_eq!(service.document_count().await, 0);
        assert_eq!(sink.persist_count().await, 0);
    }

    #[tokio::test]
    async fn test_bad_token_wins_over_incomplete_command() {
        let initial = vec![Document::new("1", "a.txt", "x")];
        let (service, sink) = create_service(initial.clone()).await;

        let without_token = UpdateDocumentCommand {
            token: None,
            ..command(SECRET, "1", "a.txt", "y")
        };
        let wrong_token_no_content = UpdateDocumentCommand {
            content: None,
            ..command("wrong", "1", "a.txt", "y")
        };
        let nothing = UpdateDocumentCommand::default();

        for cmd in [without_token, wrong_token_no_content, nothing] {
            let err = service.update_document(cmd).await.unwrap_err();
            assert!(matches!(err, DocumentServiceError::TokenMismatch));
        }

        assert_eq!(service.list_documents().await, vec![initial[0].metadata()]);
        assert_eq!(sink.persist_count().await, 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back() {
        let initial = vec![Document::new("1", "a.txt", "x")];
        let (service, sink) = create_service(initial.clone()).await;
        sink.fail_writes(true);

        let update = service
            .update_document(command(SECRET, "1", "a2.txt", "y"))
            .await;
        assert!(matches!(update, Err(DocumentServiceError::Persistence(_))));

        let insert = service
            .update_document(command(SECRET, "2", "b.txt", "z"))
            .await;
        assert!(matches!(insert, Err(DocumentServiceError::Persistence(_))));

        assert_eq!(service.document_count().await, 1);
        assert_eq!(service.get_document("1").await, Some(initial[0].clone()));

        sink.fail_writes(false);
        let outcome = service
            .update_document(command(SECRET, "2", "b.txt", "z"))
            .await
            .unwrap();
        assert!(outcome.is_insert());
    }

    #[tokio::test]
    async fn test_one_write_per_update_with_duplicates() {
        let (service, sink) = create_service(vec![
            Document::new("1", "a.txt", "x"),
            Document::new("1", "a-copy.txt", "x"),
        ])
        .await;

        service
            .update_document(command(SECRET, "1", "a.txt", "new"))
            .await
            .unwrap();

        assert_eq!(sink.persist_count().await, 1);
        let stored = sink.last_persisted().await.unwrap();
        assert!(stored.iter().all(|d| d == &Document::new("1", "a.txt", "new")));
    }

    #[tokio::test]
    async fn test_list_documents_in_order() {
        let (service, _sink) = create_service(vec![Document::new("1", "a.txt", "x")]).await;
        service
            .update_document(command(SECRET, "2", "b.txt", "y"))
            .await
            .unwrap();

        let ids: Vec<String> = service
            .list_documents()
            .await
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() {
        let (service, sink) = create_service(vec![]).await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .update_document(command(SECRET, &format!("doc-{}", i % 4), "f.txt", "c"))
                    .await
                    .unwrap()
            }));
        }
        let mut inserts = 0;
        for handle in handles {
            if handle.await.unwrap().is_insert() {
                inserts += 1;
            }
        }

        assert_eq!(inserts, 4);
        assert_eq!(service.document_count().await, 4);
        assert_eq!(sink.persist_count().await, 16);
    }
}
