use std::sync::Arc;

use crate::application::ports::{
    Embedder, EmbedderError, SearchResult, VectorFilter, VectorIndex, VectorIndexError,
};
use crate::domain::{DocumentId, SessionId};

/// Embeds query text and searches the index, always session-scoped.
pub struct RetrievalService<V>
where
    V: VectorIndex,
{
    embedder: Arc<dyn Embedder>,
    index: Arc<V>,
    default_top_k: usize,
}

impl<V> RetrievalService<V>
where
    V: VectorIndex,
{
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<V>, default_top_k: usize) -> Self {
        Self {
            embedder,
            index,
            default_top_k,
        }
    }

    #[tracing::instrument(skip(self, query), fields(session_id = %session_id))]
    pub async fn query(
        &self,
        query: &str,
        session_id: SessionId,
        document_id: Option<DocumentId>,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchResult>, RetrievalError> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RetrievalError::Embedding)?;

        let mut filter = VectorFilter::session(session_id);
        if let Some(document_id) = document_id {
            filter = filter.with_document(document_id);
        }

        let results = self
            .index
            .query(&embedding, top_k.unwrap_or(self.default_top_k), &filter)
            .await
            .map_err(RetrievalError::Search)?;

        Ok(results)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("search: {0}")]
    Search(#[from] VectorIndexError),
}
