mod dead_letters;
mod documents;
mod health;
mod ingest;
mod job_status;
mod query;

pub use dead_letters::{list_dead_letters_handler, redrive_handler};
pub use documents::{
    delete_document_handler, delete_session_documents_handler, get_document_handler,
    list_session_documents_handler,
};
pub use health::health_handler;
pub use ingest::ingest_handler;
pub use job_status::job_status_handler;
pub use query::query_handler;

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_body(message: impl Into<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: message.into(),
    })
}
