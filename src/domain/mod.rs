mod chunk;
mod document;
mod document_status;
mod embedding;
mod job;
mod job_outcome;
mod job_status;
mod segment;
mod session_id;
mod storage_path;
mod vector_record;

pub use chunk::{Chunk, ChunkId};
pub use document::{ContentType, Document, DocumentId};
pub use document_status::DocumentStatus;
pub use embedding::Embedding;
pub use job::{Job, JobId, JOB_TYPE_DOCUMENT_INGESTION};
pub use job_outcome::JobOutcome;
pub use job_status::JobStatus;
pub use segment::Segment;
pub use session_id::SessionId;
pub use storage_path::StoragePath;
pub use vector_record::VectorRecord;
