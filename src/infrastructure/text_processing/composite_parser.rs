use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{DocumentParser, ParserError};
use crate::domain::{ContentType, Document, Segment};

/// Dispatches to the parser matching the document's content type.
pub struct CompositeParser {
    text: Arc<dyn DocumentParser>,
    pdf: Arc<dyn DocumentParser>,
}

impl CompositeParser {
    pub fn new(text: Arc<dyn DocumentParser>, pdf: Arc<dyn DocumentParser>) -> Self {
        Self { text, pdf }
    }
}

#[async_trait]
impl DocumentParser for CompositeParser {
    async fn parse(&self, data: &[u8], document: &Document) -> Result<Vec<Segment>, ParserError> {
        match document.content_type {
            ContentType::Text => self.text.parse(data, document).await,
            ContentType::Pdf => self.pdf.parse(data, document).await,
        }
    }
}
