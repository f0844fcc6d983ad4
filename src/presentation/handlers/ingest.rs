use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use futures::StreamExt;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::VectorIndex;
use crate::domain::{ContentType, SessionId, StoragePath};
use crate::presentation::handlers::error_body;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct IngestResponse {
    pub job_id: String,
    pub message: String,
}

/// Accepts a multipart upload, stages it, and enqueues ingestion. Returns
/// 202 immediately; the job id is the handle for status polling.
#[tracing::instrument(skip(state, multipart))]
pub async fn ingest_handler<V>(
    State(state): State<AppState<V>>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    let session_id = match Uuid::parse_str(&session_id) {
        Ok(uuid) => SessionId::from_uuid(uuid),
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                error_body(format!("Invalid session ID: {}", session_id)),
            )
                .into_response();
        }
    };

    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Ingest request with no file");
            return (StatusCode::BAD_REQUEST, error_body("No file uploaded")).into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                StatusCode::BAD_REQUEST,
                error_body(format!("Failed to read multipart: {}", e)),
            )
                .into_response();
        }
    };

    let filename = field.file_name().unwrap_or("unknown").to_string();
    let content_type_str = field.content_type().unwrap_or("application/octet-stream");

    tracing::debug!(filename = %filename, content_type = %content_type_str, "Processing file upload");

    let content_type = match ContentType::from_mime(content_type_str) {
        Some(ct) => ct,
        None => {
            tracing::warn!(content_type = %content_type_str, "Unsupported content type");
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                error_body(format!("Unsupported content type: {}", content_type_str)),
            )
                .into_response();
        }
    };

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read file bytes");
            return (
                StatusCode::BAD_REQUEST,
                error_body(format!("Failed to read file: {}", e)),
            )
                .into_response();
        }
    };

    let upload_id = Uuid::new_v4();
    let storage_path = StoragePath::new(&session_id, &upload_id, &filename);
    let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(data) }).boxed();

    if let Err(e) = state
        .staging_store
        .store(&storage_path, stream, None)
        .await
    {
        tracing::error!(error = %e, "Failed to stage upload");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(format!("Failed to stage upload: {}", e)),
        )
            .into_response();
    }

    match state
        .gateway
        .enqueue(storage_path, session_id, filename, content_type)
        .await
    {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(IngestResponse {
                job_id: job_id.to_string(),
                message: "Document ingestion started".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to enqueue ingestion");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Failed to enqueue ingestion: {}", e)),
            )
                .into_response()
        }
    }
}
