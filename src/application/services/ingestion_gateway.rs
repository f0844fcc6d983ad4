use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::ports::{
    DocumentRepository, IngestMessage, JobQueue, JobRepository, QueueError, RepositoryError,
};
use crate::domain::{
    ContentType, Document, DocumentStatus, Job, JobId, JobOutcome, JobStatus, SessionId,
    StoragePath, JOB_TYPE_DOCUMENT_INGESTION,
};

/// Accepts upload notifications and hands them to the worker tier.
///
/// One call creates the Pending document row, the Pending job row and the
/// queue message, then returns. If the enqueue fails after the rows exist,
/// both are marked Failed before the error surfaces: a Pending job always
/// has a message behind it.
pub struct IngestionGateway {
    documents: Arc<dyn DocumentRepository>,
    jobs: Arc<dyn JobRepository>,
    queue: Arc<dyn JobQueue>,
}

impl IngestionGateway {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        jobs: Arc<dyn JobRepository>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            documents,
            jobs,
            queue,
        }
    }

    #[tracing::instrument(skip(self), fields(session_id = %session_id, name = %name))]
    pub async fn enqueue(
        &self,
        storage_path: StoragePath,
        session_id: SessionId,
        name: String,
        content_type: ContentType,
    ) -> Result<JobId, GatewayError> {
        let document = Document::new(session_id, name, content_type, storage_path.clone());
        let document_id = document.id;
        self.documents.create(&document).await?;

        let correlation_id = Uuid::new_v4();
        let job = Job::new(
            document_id,
            correlation_id,
            JOB_TYPE_DOCUMENT_INGESTION.to_string(),
        );
        let job_id = job.id;
        self.jobs.create(&job).await?;

        let message = IngestMessage {
            message_id: correlation_id,
            job_id,
            session_id,
            document_id,
            storage_path,
            enqueued_at: Utc::now(),
        };

        if let Err(e) = self.queue.enqueue(&message).await {
            tracing::error!(error = %e, job_id = %job_id, "Enqueue failed, failing job");
            let outcome = JobOutcome::Failure {
                error_type: "enqueue".to_string(),
                error_message: e.to_string(),
            };
            if let Err(mark_err) = self.jobs.finish(job_id, JobStatus::Failed, &outcome).await {
                tracing::error!(error = %mark_err, job_id = %job_id, "Failed to mark job failed after enqueue error");
            }
            if let Err(mark_err) = self
                .documents
                .update_status(document_id, DocumentStatus::Failed, Some("enqueue failed"))
                .await
            {
                tracing::error!(error = %mark_err, document_id = %document_id, "Failed to mark document failed after enqueue error");
            }
            return Err(GatewayError::Enqueue(e));
        }

        tracing::info!(
            job_id = %job_id,
            document_id = %document_id,
            "Document ingestion enqueued"
        );
        Ok(job_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("enqueue: {0}")]
    Enqueue(#[from] QueueError),
}
