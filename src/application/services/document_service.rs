use std::sync::Arc;

use crate::application::ports::{
    DocumentRepository, RepositoryError, VectorFilter, VectorIndex, VectorIndexError,
};
use crate::domain::{Document, DocumentId, SessionId};

/// Status reads and cascading removal for documents.
///
/// Removal deletes vectors by filter first and rows second; if the second
/// step fails, a retry repeats the (idempotent) vector delete rather than
/// leaving orphaned vectors behind a missing row.
pub struct DocumentService<V>
where
    V: VectorIndex,
{
    documents: Arc<dyn DocumentRepository>,
    index: Arc<V>,
}

impl<V> DocumentService<V>
where
    V: VectorIndex,
{
    pub fn new(documents: Arc<dyn DocumentRepository>, index: Arc<V>) -> Self {
        Self { documents, index }
    }

    pub async fn get(&self, id: DocumentId) -> Result<Option<Document>, DocumentServiceError> {
        Ok(self.documents.get_by_id(id).await?)
    }

    pub async fn list_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<Document>, DocumentServiceError> {
        Ok(self.documents.list_by_session(session_id).await?)
    }

    #[tracing::instrument(skip(self), fields(document_id = %id))]
    pub async fn delete_document(&self, id: DocumentId) -> Result<(), DocumentServiceError> {
        if self.documents.get_by_id(id).await?.is_none() {
            return Err(DocumentServiceError::NotFound(id.to_string()));
        }

        self.index.delete(&VectorFilter::document(id)).await?;
        self.documents.delete(id).await?;
        tracing::info!("Document and its vectors deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn delete_session(&self, session_id: SessionId) -> Result<usize, DocumentServiceError> {
        self.index.delete(&VectorFilter::session(session_id)).await?;
        let deleted = self.documents.delete_by_session(session_id).await?;
        tracing::info!(documents = deleted.len(), "Session documents deleted");
        Ok(deleted.len())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentServiceError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("vector index: {0}")]
    Index(#[from] VectorIndexError),
    #[error("document not found: {0}")]
    NotFound(String),
}
