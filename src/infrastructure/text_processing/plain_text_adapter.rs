use async_trait::async_trait;

use crate::application::ports::{DocumentParser, ParserError};
use crate::domain::{ContentType, Document, Segment};

use super::text_sanitizer::sanitize_extracted_text;

pub struct PlainTextAdapter;

#[async_trait]
impl DocumentParser for PlainTextAdapter {
    async fn parse(&self, data: &[u8], document: &Document) -> Result<Vec<Segment>, ParserError> {
        if document.content_type != ContentType::Text {
            return Err(ParserError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let text = String::from_utf8(data.to_vec())
            .map_err(|e| ParserError::ExtractionFailed(e.to_string()))?;
        let text = sanitize_extracted_text(&text);

        if text.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![Segment::new(text, None, 0)])
    }
}
