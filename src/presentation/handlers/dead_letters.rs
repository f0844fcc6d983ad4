use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::{QueueError, VectorIndex};
use crate::presentation::handlers::error_body;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct DeadLetterResponse {
    pub message_id: String,
    pub job_id: String,
    pub session_id: String,
    pub document_id: String,
    pub storage_path: String,
    pub enqueued_at: String,
}

/// Operator surface: inspect messages that exhausted their receive budget.
#[tracing::instrument(skip(state))]
pub async fn list_dead_letters_handler<V>(State(state): State<AppState<V>>) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    match state.queue.dead_letters().await {
        Ok(messages) => {
            let body: Vec<DeadLetterResponse> = messages
                .into_iter()
                .map(|m| DeadLetterResponse {
                    message_id: m.message_id.to_string(),
                    job_id: m.job_id.to_string(),
                    session_id: m.session_id.to_string(),
                    document_id: m.document_id.to_string(),
                    storage_path: m.storage_path.to_string(),
                    enqueued_at: m.enqueued_at.to_rfc3339(),
                })
                .collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list dead letters");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Failed to list dead letters: {}", e)),
            )
                .into_response()
        }
    }
}

/// Moves a dead-lettered message back onto the main queue.
#[tracing::instrument(skip(state))]
pub async fn redrive_handler<V>(
    State(state): State<AppState<V>>,
    Path(message_id): Path<String>,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    let message_id = match Uuid::parse_str(&message_id) {
        Ok(u) => u,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                error_body(format!("Invalid message ID: {}", message_id)),
            )
                .into_response();
        }
    };

    match state.queue.redrive(message_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(QueueError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            error_body(format!("Dead letter not found: {}", message_id)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Redrive failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Redrive failed: {}", e)),
            )
                .into_response()
        }
    }
}
