use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use super::map_sqlx_error;
use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{DocumentId, Job, JobId, JobOutcome, JobStatus};

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, document_id, correlation_id, job_type, status, progress, outcome, created_at, updated_at";

fn job_from_row(row: &PgRow) -> Result<Job, RepositoryError> {
    let status: String = row
        .try_get("status")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let status = status
        .parse::<JobStatus>()
        .map_err(RepositoryError::QueryFailed)?;

    let outcome: Option<serde_json::Value> = row
        .try_get("outcome")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let outcome = outcome
        .map(serde_json::from_value::<JobOutcome>)
        .transpose()
        .map_err(|e| RepositoryError::QueryFailed(format!("invalid outcome payload: {}", e)))?;

    let progress: i16 = row
        .try_get("progress")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    Ok(Job {
        id: JobId::from_uuid(
            row.try_get("id")
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        ),
        document_id: DocumentId::from_uuid(
            row.try_get("document_id")
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        ),
        correlation_id: row
            .try_get("correlation_id")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        job_type: row
            .try_get("job_type")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        status,
        progress: progress.clamp(0, 100) as u8,
        outcome,
        created_at: row
            .try_get("created_at")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
    })
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, document_id, correlation_id, job_type, status, progress, outcome, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.document_id.as_uuid())
        .bind(job.correlation_id)
        .bind(&job.job_type)
        .bind(job.status.as_str())
        .bind(job.progress as i16)
        .bind(
            job.outcome
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?,
        )
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM jobs WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_correlation_id(
        &self,
        correlation_id: Uuid,
    ) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM jobs WHERE correlation_id = $1",
            SELECT_COLUMNS
        ))
        .bind(correlation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn mark_running(&self, id: JobId, progress: u8) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'RUNNING', progress = $2, outcome = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(progress as i16)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id, progress = progress))]
    async fn set_progress(&self, id: JobId, progress: u8) -> Result<(), RepositoryError> {
        // GREATEST keeps progress monotonic even when a stale concurrent
        // delivery reports behind the current one.
        sqlx::query(
            r#"
            UPDATE jobs
            SET progress = GREATEST(progress, $2), updated_at = now()
            WHERE id = $1 AND status = 'RUNNING'
            "#,
        )
        .bind(id.as_uuid())
        .bind(progress.min(100) as i16)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self, outcome), fields(job_id = %id, status = %status))]
    async fn finish(
        &self,
        id: JobId,
        status: JobStatus,
        outcome: &JobOutcome,
    ) -> Result<(), RepositoryError> {
        if !status.is_terminal() {
            return Err(RepositoryError::ConstraintViolation(format!(
                "finish requires a terminal status, got {}",
                status
            )));
        }

        let payload = serde_json::to_value(outcome)
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2,
                outcome = $3,
                progress = CASE WHEN $2 = 'COMPLETED' THEN 100 ELSE progress END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM jobs WHERE status = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(job_from_row).collect()
    }
}
