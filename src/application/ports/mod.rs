mod collection_config;
mod distance_metric;
mod document_parser;
mod document_repository;
mod embedder;
mod job_repository;
mod payload_field_type;
mod payload_index;
mod progress;
mod queue;
mod repository_error;
mod search_result;
mod staging_store;
mod text_splitter;
mod vector_index;
mod vector_index_error;

pub use collection_config::CollectionConfig;
pub use distance_metric::DistanceMetric;
pub use document_parser::{DocumentParser, ParserError};
pub use document_repository::DocumentRepository;
pub use embedder::{Embedder, EmbedderError};
pub use job_repository::JobRepository;
pub use payload_field_type::PayloadFieldType;
pub use payload_index::PayloadIndex;
pub use progress::{NoopProgress, ProgressSink};
pub use queue::{Delivery, IngestMessage, JobQueue, QueueConfig, QueueError};
pub use repository_error::RepositoryError;
pub use search_result::SearchResult;
pub use staging_store::{StagingStore, StagingStoreError};
pub use text_splitter::{TextSplitter, TextSplitterError};
pub use vector_index::{VectorFilter, VectorIndex};
pub use vector_index_error::VectorIndexError;
