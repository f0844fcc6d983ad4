use async_trait::async_trait;

use super::{CollectionConfig, SearchResult, VectorIndexError};
use crate::domain::{DocumentId, Embedding, SessionId, VectorRecord};

/// Session-scoped vector store.
///
/// `upsert` is idempotent by record id: replaying the same records overwrites
/// instead of duplicating. Deletion is filter-driven so document and session
/// removal can cascade without enumerating chunk ids.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn ensure_collection(&self, config: &CollectionConfig) -> Result<bool, VectorIndexError>;

    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), VectorIndexError>;

    async fn query(
        &self,
        embedding: &Embedding,
        top_k: usize,
        filter: &VectorFilter,
    ) -> Result<Vec<SearchResult>, VectorIndexError>;

    async fn delete(&self, filter: &VectorFilter) -> Result<(), VectorIndexError>;

    /// Opaque reference to where the records live (e.g. the collection
    /// name), recorded in job success payloads.
    fn reference(&self) -> String;
}

/// Predicates over the filterable metadata fields. Text payload is
/// intentionally not filterable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorFilter {
    pub session_id: Option<SessionId>,
    pub document_id: Option<DocumentId>,
    pub position: Option<u32>,
}

impl VectorFilter {
    pub fn session(session_id: SessionId) -> Self {
        Self {
            session_id: Some(session_id),
            ..Self::default()
        }
    }

    pub fn document(document_id: DocumentId) -> Self {
        Self {
            document_id: Some(document_id),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, document_id: DocumentId) -> Self {
        self.document_id = Some(document_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.document_id.is_none() && self.position.is_none()
    }

    pub fn matches(&self, record: &VectorRecord) -> bool {
        if let Some(session_id) = self.session_id {
            if record.session_id != session_id {
                return false;
            }
        }
        if let Some(document_id) = self.document_id {
            if record.document_id != document_id {
                return false;
            }
        }
        if let Some(position) = self.position {
            if record.position != position {
                return false;
            }
        }
        true
    }
}
