use super::{ChunkId, DocumentId, Embedding, SessionId};

/// The indexed projection of an embedded chunk.
///
/// `session_id`, `document_id` and `position` are filterable metadata; the
/// raw text is stored as payload but never used as a filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: ChunkId,
    pub embedding: Embedding,
    pub session_id: SessionId,
    pub document_id: DocumentId,
    pub position: u32,
    pub text: String,
}
