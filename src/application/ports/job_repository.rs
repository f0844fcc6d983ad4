use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::{Job, JobId, JobOutcome, JobStatus};

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// Looks a job up by the id of the queue message that carries it. The
    /// correlation id is unique, so redeliveries always resolve to the same
    /// row.
    async fn find_by_correlation_id(
        &self,
        correlation_id: Uuid,
    ) -> Result<Option<Job>, RepositoryError>;

    /// Moves the job to Running and clears any previous outcome. Used both
    /// for the first delivery and when a Failed job is re-run on redelivery.
    async fn mark_running(&self, id: JobId, progress: u8) -> Result<(), RepositoryError>;

    /// Advances progress. Writes never move progress backwards; a stale
    /// writer racing a concurrent delivery is clamped, not honored.
    async fn set_progress(&self, id: JobId, progress: u8) -> Result<(), RepositoryError>;

    /// Records a terminal status with its outcome payload. `status` must be
    /// Completed or Failed; Completed forces progress to 100.
    async fn finish(
        &self,
        id: JobId,
        status: JobStatus,
        outcome: &JobOutcome,
    ) -> Result<(), RepositoryError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;
}
