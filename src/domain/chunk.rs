use std::fmt;

use uuid::Uuid;

use super::{DocumentId, Embedding, SessionId};

/// Namespace for deriving chunk ids. Fixed so that the same input always
/// derives the same id across processes and replays.
const CHUNK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x7a1f_4c2e_9b3d_4e5f_8a6b_1c2d_3e4f_5a6b);

/// A contiguous piece of a document, sized for embedding.
///
/// Chunk identity is derived from (source locator, position, content), never
/// random: reprocessing unchanged input yields identical ids, which is what
/// makes index writes upserts instead of duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub document_id: DocumentId,
    pub session_id: SessionId,
    pub position: u32,
    pub page: Option<u32>,
    pub section: Option<String>,
    pub offset: usize,
    pub embedding: Option<Embedding>,
}

impl Chunk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        text: String,
        document_id: DocumentId,
        session_id: SessionId,
        source: &str,
        position: u32,
        page: Option<u32>,
        section: Option<String>,
        offset: usize,
    ) -> Self {
        let id = ChunkId::derive(source, position, &text);
        Self {
            id,
            text,
            document_id,
            session_id,
            position,
            page,
            section,
            offset,
            embedding: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(Uuid);

impl ChunkId {
    /// Derive a deterministic id from the source locator, the chunk's
    /// position within the document, and its content.
    pub fn derive(source: &str, position: u32, text: &str) -> Self {
        let mut name = Vec::with_capacity(source.len() + text.len() + 16);
        name.extend_from_slice(source.as_bytes());
        name.push(0);
        name.extend_from_slice(&position.to_be_bytes());
        name.push(0);
        name.extend_from_slice(text.as_bytes());
        Self(Uuid::new_v5(&CHUNK_ID_NAMESPACE, &name))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
