//! HTTP API for the document server.

use crate::application_service::document_service::{
    DocumentService, DocumentServiceError, UpdateDocumentCommand,
};
use crate::domain::document::DocumentMetadata;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state shared across handlers.
pub type AppState = Arc<DocumentService>;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/document", put(update_document).options(preflight))
        .route("/documents", get(list_documents))
        .route("/documents/{id}", get(get_document))
        .with_state(state)
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Update body. Missing fields are reported after the token check.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub token: Option<String>,
    pub file_name: Option<String>,
    pub id: Option<String>,
    pub content: Option<String>,
}

impl From<UpdateDocumentRequest> for UpdateDocumentCommand {
    fn from(req: UpdateDocumentRequest) -> Self {
        UpdateDocumentCommand {
            token: req.token,
            id: req.id,
            file_name: req.file_name,
            content: req.content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub documents: usize,
}

const UPDATE_METHODS: &str = "PUT, OPTIONS";
const READ_METHODS: &str = "GET";

/// Cross-origin headers attached to every document response, advertising the
/// methods of the route that produced it.
fn cors_headers(methods: &'static str) -> [(HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, methods),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "X-Requested-With, Content-Type, Accept, Origin",
        ),
    ]
}

fn message_response(
    status: StatusCode,
    methods: &'static str,
    msg: impl Into<String>,
) -> Response {
    (
        status,
        cors_headers(methods),
        Json(MessageResponse { msg: msg.into() }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        documents: state.document_count().await,
    })
}

/// CORS preflight for the update endpoint.
async fn preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, cors_headers(UPDATE_METHODS))
}

/// Add a document, or replace the stored one with the same id.
async fn update_document(
    State(state): State<AppState>,
    payload: Result<Json<UpdateDocumentRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!("Rejected update body: {}", rejection.body_text());
            return message_response(
                StatusCode::BAD_REQUEST,
                UPDATE_METHODS,
                format!("Invalid request body: {}", rejection.body_text()),
            );
        }
    };

    match state.update_document(req.into()).await {
        Ok(outcome) => message_response(StatusCode::OK, UPDATE_METHODS, outcome.message()),
        Err(e) => {
            let status = match &e {
                DocumentServiceError::TokenMismatch | DocumentServiceError::InvalidRequest(_) => {
                    StatusCode::BAD_REQUEST
                }
                DocumentServiceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            message_response(status, UPDATE_METHODS, e.to_string())
        }
    }
}

/// List metadata of all documents.
async fn list_documents(State(state): State<AppState>) -> impl IntoResponse {
    (
        cors_headers(READ_METHODS),
        Json::<Vec<DocumentMetadata>>(state.list_documents().await),
    )
}

/// Get a single document including its content.
async fn get_document(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.get_document(&id).await {
        Some(document) => (cors_headers(READ_METHODS), Json(document)).into_response(),
        None => message_response(
            StatusCode::NOT_FOUND,
            READ_METHODS,
            format!("Document not found: {}", id),
        ),
    }
}
