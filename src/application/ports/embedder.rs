use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Embedding;

/// Produces embedding vectors via an external provider.
///
/// Failures here are transient by classification: rate limits, network and
/// provider availability. The worker leaves the delivery unacked so the
/// queue retries.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("embedding api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("embedding rate limited")]
    RateLimited,
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("embedding timed out after {0:?}")]
    Timeout(Duration),
}
