use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::Instrument;

use crate::application::ports::{
    Delivery, DocumentParser, DocumentRepository, JobQueue, JobRepository, ProgressSink,
    QueueError, RepositoryError, TextSplitter, VectorIndex,
};
use crate::application::services::{IngestionPipeline, PipelineReport};
use crate::domain::{Document, DocumentStatus, Job, JobId, JobOutcome, JobStatus};

const INITIAL_PROGRESS: u8 = 10;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Messages claimed per receive. Kept small to bound the blast radius of
    /// a bad document.
    pub batch_size: usize,
    pub poll_interval: Duration,
    /// Attempts for each relational write before the delivery is abandoned
    /// unacked.
    pub persistence_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            poll_interval: Duration::from_secs(1),
            persistence_retries: 3,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

/// Queue consumer: drains deliveries and drives each one through the
/// pipeline, owning every job/document status transition.
///
/// The queue is at-least-once, so every path here tolerates a second
/// delivery of the same message: completed jobs short-circuit to an ack, and
/// everything downstream is idempotent (deterministic chunk ids, upserts).
pub struct IngestionWorker<P: ?Sized, V, S: ?Sized>
where
    P: DocumentParser,
    V: VectorIndex,
    S: TextSplitter,
{
    queue: Arc<dyn JobQueue>,
    jobs: Arc<dyn JobRepository>,
    documents: Arc<dyn DocumentRepository>,
    pipeline: Arc<IngestionPipeline<P, V, S>>,
    config: WorkerConfig,
}

impl<P: ?Sized, V, S: ?Sized> IngestionWorker<P, V, S>
where
    P: DocumentParser + 'static,
    V: VectorIndex + 'static,
    S: TextSplitter + 'static,
{
    pub fn new(
        queue: Arc<dyn JobQueue>,
        jobs: Arc<dyn JobRepository>,
        documents: Arc<dyn DocumentRepository>,
        pipeline: Arc<IngestionPipeline<P, V, S>>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            jobs,
            documents,
            pipeline,
            config,
        }
    }

    pub async fn run(self) {
        tracing::info!("Ingestion worker started");
        loop {
            match self.poll_once().await {
                Ok(0) => tokio::time::sleep(self.config.poll_interval).await,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Queue receive failed");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    /// Claims one batch and processes it, returning how many deliveries were
    /// handled. Exposed separately from `run` so callers can drain a known
    /// backlog deterministically.
    pub async fn poll_once(&self) -> Result<usize, QueueError> {
        let deliveries = self.queue.receive(self.config.batch_size).await?;
        let handled = deliveries.len();
        for delivery in deliveries {
            let span = tracing::info_span!(
                "ingestion_job",
                job_id = %delivery.message.job_id,
                document_id = %delivery.message.document_id,
                receive_count = delivery.receive_count,
            );
            self.handle_delivery(delivery).instrument(span).await;
        }
        Ok(handled)
    }

    async fn handle_delivery(&self, delivery: Delivery) {
        let msg = &delivery.message;

        let job = match self
            .with_backoff("find_by_correlation_id", || {
                self.jobs.find_by_correlation_id(msg.message_id)
            })
            .await
        {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!(message_id = %msg.message_id, "No job for message, dropping");
                self.ack(&delivery).await;
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Job lookup failed, leaving delivery for retry");
                return;
            }
        };

        if job.status == JobStatus::Completed {
            tracing::debug!("Duplicate delivery of completed job, acking");
            self.ack(&delivery).await;
            return;
        }

        let document = match self
            .with_backoff("get_document", || self.documents.get_by_id(msg.document_id))
            .await
        {
            Ok(Some(document)) => document,
            Ok(None) => {
                let outcome = JobOutcome::Failure {
                    error_type: "content".to_string(),
                    error_message: "document record missing".to_string(),
                };
                self.finish_job(&job, JobStatus::Failed, &outcome).await;
                self.ack(&delivery).await;
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Document lookup failed, leaving delivery for retry");
                return;
            }
        };

        if self
            .with_backoff("mark_running", || {
                self.jobs.mark_running(job.id, INITIAL_PROGRESS)
            })
            .await
            .is_err()
        {
            return;
        }
        if self
            .with_backoff("mark_processing", || {
                self.documents
                    .update_status(document.id, DocumentStatus::Processing, None)
            })
            .await
            .is_err()
        {
            return;
        }

        let progress = JobProgress {
            jobs: Arc::clone(&self.jobs),
            job_id: job.id,
        };

        match self.pipeline.process(&document, &progress).await {
            Ok(report) => self.complete(&delivery, &job, &document, report).await,
            Err(e) => {
                let retryable = e.is_retryable();
                let outcome = JobOutcome::Failure {
                    error_type: e.error_type().to_string(),
                    error_message: e.to_string(),
                };
                tracing::error!(
                    error = %e,
                    stage = e.stage(),
                    retryable,
                    "Ingestion pipeline failed"
                );

                let error_message = outcome_message(&outcome);
                if self
                    .with_backoff("mark_document_failed", || {
                        self.documents.update_status(
                            document.id,
                            DocumentStatus::Failed,
                            Some(error_message.as_str()),
                        )
                    })
                    .await
                    .is_err()
                {
                    return;
                }
                self.finish_job(&job, JobStatus::Failed, &outcome).await;

                if retryable {
                    tracing::warn!(
                        receive_count = delivery.receive_count,
                        "Leaving delivery unacked for queue redelivery"
                    );
                } else {
                    // Redelivering unparseable content cannot succeed.
                    self.ack(&delivery).await;
                }
            }
        }
    }

    async fn complete(
        &self,
        delivery: &Delivery,
        job: &Job,
        document: &Document,
        report: PipelineReport,
    ) {
        if self
            .with_backoff("mark_document_completed", || {
                self.documents
                    .update_status(document.id, DocumentStatus::Completed, None)
            })
            .await
            .is_err()
        {
            return;
        }

        let chunk_count = report.chunk_count;
        let outcome = JobOutcome::Success {
            chunk_count,
            processing_time_ms: report.processing_time_ms,
            index_reference: report.index_reference,
        };
        if self
            .with_backoff("finish_job", || {
                self.jobs.finish(job.id, JobStatus::Completed, &outcome)
            })
            .await
            .is_err()
        {
            // Job row still Running: the redelivery re-runs the pipeline,
            // which converges on the same index state.
            return;
        }

        self.ack(delivery).await;
        tracing::info!(chunk_count, "Ingestion completed");
    }

    async fn finish_job(&self, job: &Job, status: JobStatus, outcome: &JobOutcome) {
        if let Err(e) = self
            .with_backoff("finish_job", || self.jobs.finish(job.id, status, outcome))
            .await
        {
            tracing::error!(error = %e, job_id = %job.id, "Failed to record job outcome");
        }
    }

    async fn ack(&self, delivery: &Delivery) {
        if let Err(e) = self.queue.ack(delivery).await {
            tracing::warn!(
                error = %e,
                message_id = %delivery.message.message_id,
                "Ack failed, message may be redelivered"
            );
        }
    }

    /// Retries a relational write with doubling backoff before giving up on
    /// this delivery.
    async fn with_backoff<T, F, Fut>(&self, op: &str, mut call: F) -> Result<T, RepositoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RepositoryError>>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_backoff;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempts < self.config.persistence_retries => {
                    attempts += 1;
                    tracing::warn!(
                        error = %e,
                        op,
                        attempt = attempts,
                        delay_ms = delay.as_millis(),
                        "Relational write failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    tracing::error!(error = %e, op, "Relational write failed after retries");
                    return Err(e);
                }
            }
        }
    }
}

fn outcome_message(outcome: &JobOutcome) -> String {
    match outcome {
        JobOutcome::Failure { error_message, .. } => error_message.clone(),
        JobOutcome::Success { .. } => String::new(),
    }
}

/// Bridges pipeline progress onto the job row. Failures are logged and
/// dropped: progress is advisory and never aborts a stage.
struct JobProgress {
    jobs: Arc<dyn JobRepository>,
    job_id: JobId,
}

#[async_trait]
impl ProgressSink for JobProgress {
    async fn report(&self, progress: u8) {
        if let Err(e) = self.jobs.set_progress(self.job_id, progress).await {
            tracing::warn!(
                error = %e,
                job_id = %self.job_id,
                progress,
                "Failed to record job progress"
            );
        }
    }
}
