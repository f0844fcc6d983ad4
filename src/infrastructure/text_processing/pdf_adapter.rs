use async_trait::async_trait;
use lopdf::Document as PdfDocument;

use crate::application::ports::{DocumentParser, ParserError};
use crate::domain::{ContentType, Document, Segment};

use super::text_sanitizer::sanitize_extracted_text;

/// Extracts one segment per page that carries text.
#[derive(Default)]
pub struct PdfAdapter;

impl PdfAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PdfAdapter {
    #[tracing::instrument(
        skip(self, data),
        fields(document_id = %document.id, name = %document.name)
    )]
    async fn parse(&self, data: &[u8], document: &Document) -> Result<Vec<Segment>, ParserError> {
        if document.content_type != ContentType::Pdf {
            return Err(ParserError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let pdf = PdfDocument::load_mem(data)
            .map_err(|e| ParserError::ExtractionFailed(format!("failed to parse PDF: {}", e)))?;

        let mut segments = Vec::new();
        let mut offset = 0;

        for (page_number, _) in pdf.get_pages() {
            let raw = pdf.extract_text(&[page_number]).unwrap_or_default();
            let text = sanitize_extracted_text(&raw);

            if text.is_empty() {
                continue;
            }

            let length = text.chars().count();
            segments.push(Segment::new(text, Some(page_number), offset));
            offset += length;
        }

        tracing::debug!(pages = segments.len(), "PDF text extracted");
        Ok(segments)
    }
}
