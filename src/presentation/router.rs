use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::VectorIndex;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    delete_document_handler, delete_session_documents_handler, get_document_handler,
    health_handler, ingest_handler, job_status_handler, list_dead_letters_handler,
    list_session_documents_handler, query_handler, redrive_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<V>(state: AppState<V>) -> Router
where
    V: VectorIndex + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/sessions/{session_id}/documents",
            post(ingest_handler::<V>)
                .get(list_session_documents_handler::<V>)
                .delete(delete_session_documents_handler::<V>),
        )
        .route("/api/v1/jobs/{job_id}", get(job_status_handler::<V>))
        .route(
            "/api/v1/documents/{document_id}",
            get(get_document_handler::<V>).delete(delete_document_handler::<V>),
        )
        .route("/api/v1/query", post(query_handler::<V>))
        .route("/api/v1/dead-letters", get(list_dead_letters_handler::<V>))
        .route(
            "/api/v1/dead-letters/{message_id}/redrive",
            post(redrive_handler::<V>),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
