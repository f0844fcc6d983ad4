//! In-memory [`VectorIndex`] for tests and local development.
//!
//! Brute-force cosine similarity over everything stored, behind a `RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::ports::{
    CollectionConfig, SearchResult, VectorFilter, VectorIndex, VectorIndexError,
};
use crate::domain::{ChunkId, Embedding, VectorRecord};

pub struct InMemoryVectorIndex {
    records: RwLock<HashMap<ChunkId, VectorRecord>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("index lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn ensure_collection(&self, _config: &CollectionConfig) -> Result<bool, VectorIndexError> {
        Ok(false)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), VectorIndexError> {
        let mut stored = self.records.write().expect("index lock poisoned");
        for record in records {
            stored.insert(record.id, record.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        embedding: &Embedding,
        top_k: usize,
        filter: &VectorFilter,
    ) -> Result<Vec<SearchResult>, VectorIndexError> {
        let stored = self.records.read().expect("index lock poisoned");
        let mut results: Vec<SearchResult> = stored
            .values()
            .filter(|record| filter.matches(record))
            .map(|record| SearchResult {
                id: record.id,
                document_id: record.document_id,
                session_id: record.session_id,
                position: record.position,
                text: record.text.clone(),
                score: embedding.cosine_similarity(&record.embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }

    async fn delete(&self, filter: &VectorFilter) -> Result<(), VectorIndexError> {
        if filter.is_empty() {
            return Err(VectorIndexError::DeleteFailed(
                "refusing to delete with an empty filter".to_string(),
            ));
        }

        let mut stored = self.records.write().expect("index lock poisoned");
        stored.retain(|_, record| !filter.matches(record));
        Ok(())
    }

    fn reference(&self) -> String {
        "memory".to_string()
    }
}
