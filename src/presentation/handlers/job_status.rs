use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::VectorIndex;
use crate::domain::{JobId, JobOutcome};
use crate::presentation::handlers::error_body;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub document_id: String,
    pub job_type: String,
    pub status: String,
    pub progress: u8,
    pub result: Option<JobOutcome>,
    pub created_at: String,
    pub updated_at: String,
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler<V>(
    State(state): State<AppState<V>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    let uuid = match Uuid::parse_str(&job_id) {
        Ok(u) => u,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                error_body(format!("Invalid job ID: {}", job_id)),
            )
                .into_response();
        }
    };

    match state.job_repository.get_by_id(JobId::from_uuid(uuid)).await {
        Ok(Some(job)) => {
            let response = JobStatusResponse {
                id: job.id.to_string(),
                document_id: job.document_id.to_string(),
                job_type: job.job_type,
                status: job.status.as_str().to_string(),
                progress: job.progress,
                result: job.outcome,
                created_at: job.created_at.to_rfc3339(),
                updated_at: job.updated_at.to_rfc3339(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_body(format!("Job not found: {}", job_id)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Failed to fetch job: {}", e)),
            )
                .into_response()
        }
    }
}
