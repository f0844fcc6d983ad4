use std::sync::Arc;

use crate::application::ports::{JobQueue, JobRepository, StagingStore, VectorIndex};
use crate::application::services::{DocumentService, IngestionGateway, RetrievalService};

pub struct AppState<V>
where
    V: VectorIndex,
{
    pub gateway: Arc<IngestionGateway>,
    pub retrieval_service: Arc<RetrievalService<V>>,
    pub document_service: Arc<DocumentService<V>>,
    pub job_repository: Arc<dyn JobRepository>,
    pub staging_store: Arc<dyn StagingStore>,
    pub queue: Arc<dyn JobQueue>,
}

impl<V> Clone for AppState<V>
where
    V: VectorIndex,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            retrieval_service: Arc::clone(&self.retrieval_service),
            document_service: Arc::clone(&self.document_service),
            job_repository: Arc::clone(&self.job_repository),
            staging_store: Arc::clone(&self.staging_store),
            queue: Arc::clone(&self.queue),
        }
    }
}
