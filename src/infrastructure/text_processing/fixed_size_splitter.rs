use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::{Chunk, Document, Segment};

/// Character-window splitter with overlap.
///
/// Positions run across all segments of a document, so a chunk's identity is
/// stable as long as the document content is: ids are derived from the
/// storage locator, the position and the chunk text.
pub struct FixedSizeSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }
}

#[async_trait]
impl TextSplitter for FixedSizeSplitter {
    async fn split(
        &self,
        segments: &[Segment],
        document: &Document,
    ) -> Result<Vec<Chunk>, TextSplitterError> {
        if segments.is_empty() {
            return Err(TextSplitterError::EmptyInput);
        }

        let source = document.storage_path.as_str();
        let step = if self.chunk_size > self.chunk_overlap {
            self.chunk_size - self.chunk_overlap
        } else {
            self.chunk_size
        };
        if step == 0 {
            return Err(TextSplitterError::SplittingFailed(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        let mut chunks = Vec::new();
        let mut position: u32 = 0;

        for segment in segments {
            let chars: Vec<char> = segment.text.chars().collect();
            let total_len = chars.len();

            let mut offset = 0;
            while offset < total_len {
                let end = (offset + self.chunk_size).min(total_len);
                let chunk_text: String = chars[offset..end].iter().collect();

                chunks.push(Chunk::new(
                    chunk_text,
                    document.id,
                    document.session_id,
                    source,
                    position,
                    segment.page,
                    segment.section.clone(),
                    segment.offset + offset,
                ));

                position += 1;
                offset += step;
            }
        }

        Ok(chunks)
    }
}
