mod document_service;
mod ingestion_gateway;
mod ingestion_worker;
mod pipeline;
mod retrieval_service;

pub use document_service::{DocumentService, DocumentServiceError};
pub use ingestion_gateway::{GatewayError, IngestionGateway};
pub use ingestion_worker::{IngestionWorker, WorkerConfig};
pub use pipeline::{IngestionPipeline, PipelineConfig, PipelineError, PipelineReport};
pub use retrieval_service::{RetrievalError, RetrievalService};
