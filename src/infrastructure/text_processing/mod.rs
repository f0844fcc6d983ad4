mod composite_parser;
mod fixed_size_splitter;
mod pdf_adapter;
mod plain_text_adapter;
mod text_sanitizer;

pub use composite_parser::CompositeParser;
pub use fixed_size_splitter::FixedSizeSplitter;
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::PlainTextAdapter;
pub use text_sanitizer::sanitize_extracted_text;
