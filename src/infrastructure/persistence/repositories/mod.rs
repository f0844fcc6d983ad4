mod in_memory_repository;
mod pg_document_repository;
mod pg_job_repository;

pub use in_memory_repository::{InMemoryDocumentRepository, InMemoryJobRepository};
pub use pg_document_repository::PgDocumentRepository;
pub use pg_job_repository::PgJobRepository;

use crate::application::ports::RepositoryError;

pub(crate) fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::ConstraintViolation(db_err.to_string());
        }
    }
    RepositoryError::QueryFailed(e.to_string())
}
