use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Document, DocumentId, DocumentStatus, SessionId};

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &Document) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError>;

    async fn list_by_session(&self, session_id: SessionId)
        -> Result<Vec<Document>, RepositoryError>;

    async fn update_status(
        &self,
        id: DocumentId,
        status: DocumentStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError>;

    /// Removes every document of the session, returning the ids that were
    /// deleted so callers can cascade into the vector index.
    async fn delete_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<DocumentId>, RepositoryError>;
}
