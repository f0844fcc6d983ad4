mod in_memory_index;
mod qdrant_adapter;

pub use in_memory_index::InMemoryVectorIndex;
pub use qdrant_adapter::QdrantAdapter;
