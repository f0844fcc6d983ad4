/// A parsed slice of a document: text plus where it came from.
///
/// Segments are the parser's output and the splitter's input. Offsets are
/// character offsets into the extracted text of the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub page: Option<u32>,
    pub section: Option<String>,
    pub offset: usize,
}

impl Segment {
    pub fn new(text: String, page: Option<u32>, offset: usize) -> Self {
        Self {
            text,
            page,
            section: None,
            offset,
        }
    }
}
