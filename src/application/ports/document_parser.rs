use async_trait::async_trait;

use crate::domain::{Document, Segment};

/// Extracts ordered text segments from a staged document.
///
/// Zero segments is a valid, successful output (nothing extractable).
/// Failures here are content errors: the bytes cannot become text no matter
/// how often the message is redelivered.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, data: &[u8], document: &Document) -> Result<Vec<Segment>, ParserError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
}
