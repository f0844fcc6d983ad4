use async_trait::async_trait;

use crate::domain::{Chunk, Document, Segment};

/// Turns parsed segments into chunks with deterministic ids.
///
/// Errors are validation errors on structurally invalid input; callers that
/// have nothing to split should not invoke the splitter at all.
#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split(
        &self,
        segments: &[Segment],
        document: &Document,
    ) -> Result<Vec<Chunk>, TextSplitterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("no segments to split")]
    EmptyInput,
    #[error("splitting failed: {0}")]
    SplittingFailed(String),
}
