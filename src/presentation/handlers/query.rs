use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::VectorIndex;
use crate::domain::{DocumentId, SessionId};
use crate::presentation::handlers::error_body;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub session_id: Uuid,
    pub document_id: Option<Uuid>,
    pub top_k: Option<usize>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub results: Vec<QueryHit>,
}

#[derive(Serialize)]
pub struct QueryHit {
    pub id: String,
    pub document_id: String,
    pub position: u32,
    pub text: String,
    pub score: f32,
}

#[tracing::instrument(skip(state, request), fields(session_id = %request.session_id))]
pub async fn query_handler<V>(
    State(state): State<AppState<V>>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse
where
    V: VectorIndex + 'static,
{
    if request.query.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, error_body("Query must not be empty")).into_response();
    }

    let session_id = SessionId::from_uuid(request.session_id);
    let document_id = request.document_id.map(DocumentId::from_uuid);

    match state
        .retrieval_service
        .query(&request.query, session_id, document_id, request.top_k)
        .await
    {
        Ok(results) => {
            let hits = results
                .into_iter()
                .map(|r| QueryHit {
                    id: r.id.to_string(),
                    document_id: r.document_id.to_string(),
                    position: r.position,
                    text: r.text,
                    score: r.score,
                })
                .collect();
            (StatusCode::OK, Json(QueryResponse { results: hits })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("Query failed: {}", e)),
            )
                .into_response()
        }
    }
}
