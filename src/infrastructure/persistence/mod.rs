mod pg_pool;
pub mod repositories;
pub mod vector_store;

pub use pg_pool::create_pool;
pub use repositories::{
    InMemoryDocumentRepository, InMemoryJobRepository, PgDocumentRepository, PgJobRepository,
};
pub use vector_store::{InMemoryVectorIndex, QdrantAdapter};
