use crate::domain::{ChunkId, DocumentId, SessionId};

/// One ranked hit from a similarity query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub session_id: SessionId,
    pub position: u32,
    pub text: String,
    pub score: f32,
}
