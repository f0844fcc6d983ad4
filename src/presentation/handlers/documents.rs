use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::VectorIndex;
use crate::application::services::DocumentServiceError;
use crate::domain::{Document, DocumentId, SessionId};
use crate::presentation::handlers::error_body;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub content_type: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id.to_string(),
            session_id: document.session_id.to_string(),
            name: document.name,
            content_type: document.content_type.as_mime().to_string(),
            status: document.status.as_str().to_string(),
            error_message: document.error_message,
            created_at: document.created_at.to_rfc3339(),
            updated_at: document.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionDeleteResponse {
    pub deleted: usize,
}

#[tracing::instrument(skip(state))]
pub async fn get_document_handler<V>(
    State(state): State<AppState<V>>,
    Path(document_id): Path<String>,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.document_service.get(id).await {
        Ok(Some(document)) => {
            (StatusCode::OK, Json(DocumentResponse::from(document))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(format!("Document not found: {}", document_id)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch document");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Failed to fetch document: {}", e)),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_session_documents_handler<V>(
    State(state): State<AppState<V>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.document_service.list_by_session(session_id).await {
        Ok(documents) => {
            let body: Vec<DocumentResponse> =
                documents.into_iter().map(DocumentResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list documents");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Failed to list documents: {}", e)),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_document_handler<V>(
    State(state): State<AppState<V>>,
    Path(document_id): Path<String>,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    let id = match parse_document_id(&document_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.document_service.delete_document(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(DocumentServiceError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            error_body(format!("Document not found: {}", document_id)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete document");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Failed to delete document: {}", e)),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_session_documents_handler<V>(
    State(state): State<AppState<V>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.document_service.delete_session(session_id).await {
        Ok(deleted) => (StatusCode::OK, Json(SessionDeleteResponse { deleted })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete session documents");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Failed to delete session documents: {}", e)),
            )
                .into_response()
        }
    }
}

fn parse_document_id(raw: &str) -> Result<DocumentId, axum::response::Response> {
    Uuid::parse_str(raw)
        .map(DocumentId::from_uuid)
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                error_body(format!("Invalid document ID: {}", raw)),
            )
                .into_response()
        })
}

fn parse_session_id(raw: &str) -> Result<SessionId, axum::response::Response> {
    Uuid::parse_str(raw).map(SessionId::from_uuid).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            error_body(format!("Invalid session ID: {}", raw)),
        )
            .into_response()
    })
}
