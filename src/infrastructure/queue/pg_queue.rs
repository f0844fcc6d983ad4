use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::ports::{
    Delivery, IngestMessage, JobQueue, QueueConfig, QueueError,
};
use crate::domain::{DocumentId, JobId, SessionId, StoragePath};

/// Postgres-backed queue with SQS-style semantics.
///
/// A message row is claimed with `FOR UPDATE SKIP LOCKED`, which pushes its
/// `visible_at` past the visibility timeout and bumps `receive_count`; an ack
/// deletes the row by (message id, receipt). Rows whose receive budget is
/// exhausted are swept into `ingest_dead_letters` the next time they come
/// due, where they stay until an operator redrives them.
pub struct PgQueue {
    pool: PgPool,
    config: QueueConfig,
}

impl PgQueue {
    pub fn new(pool: PgPool, config: QueueConfig) -> Self {
        Self { pool, config }
    }
}

fn message_from_row(row: &PgRow) -> Result<IngestMessage, QueueError> {
    let get_err = |e: sqlx::Error| QueueError::ReceiveFailed(e.to_string());

    let storage_path: String = row.try_get("storage_path").map_err(get_err)?;

    Ok(IngestMessage {
        message_id: row.try_get("message_id").map_err(get_err)?,
        job_id: JobId::from_uuid(row.try_get("job_id").map_err(get_err)?),
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get_err)?),
        document_id: DocumentId::from_uuid(row.try_get("document_id").map_err(get_err)?),
        storage_path: StoragePath::from_raw(storage_path),
        enqueued_at: row.try_get("enqueued_at").map_err(get_err)?,
    })
}

#[async_trait]
impl JobQueue for PgQueue {
    #[instrument(skip(self, message), fields(message_id = %message.message_id))]
    async fn enqueue(&self, message: &IngestMessage) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            INSERT INTO ingest_queue (message_id, job_id, session_id, document_id, storage_path, enqueued_at, visible_at, receive_count)
            VALUES ($1, $2, $3, $4, $5, $6, now(), 0)
            "#,
        )
        .bind(message.message_id)
        .bind(message.job_id.as_uuid())
        .bind(message.session_id.as_uuid())
        .bind(message.document_id.as_uuid())
        .bind(message.storage_path.as_str())
        .bind(message.enqueued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::EnqueueFailed(e.to_string()))?;

        debug!("Message enqueued");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn receive(&self, batch_size: usize) -> Result<Vec<Delivery>, QueueError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        // Messages that came due with their budget already spent go to the
        // dead-letter queue instead of another consumer.
        let swept = sqlx::query(
            r#"
            WITH exhausted AS (
                DELETE FROM ingest_queue
                WHERE visible_at <= now() AND receive_count >= $1
                RETURNING message_id, job_id, session_id, document_id, storage_path, enqueued_at
            )
            INSERT INTO ingest_dead_letters (message_id, job_id, session_id, document_id, storage_path, enqueued_at, dead_lettered_at)
            SELECT message_id, job_id, session_id, document_id, storage_path, enqueued_at, now()
            FROM exhausted
            "#,
        )
        .bind(self.config.max_receive_count as i32)
        .execute(&mut *tx)
        .await
        .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        if swept.rows_affected() > 0 {
            warn!(count = swept.rows_affected(), "Messages dead-lettered");
        }

        let rows = sqlx::query(
            r#"
            WITH due AS (
                SELECT message_id FROM ingest_queue
                WHERE visible_at <= now()
                ORDER BY enqueued_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE ingest_queue q
            SET visible_at = now() + make_interval(secs => $2),
                receive_count = q.receive_count + 1,
                receipt = gen_random_uuid()
            FROM due
            WHERE q.message_id = due.message_id
            RETURNING q.message_id, q.job_id, q.session_id, q.document_id, q.storage_path, q.enqueued_at, q.receipt, q.receive_count
            "#,
        )
        .bind(batch_size as i64)
        .bind(self.config.visibility_timeout.as_secs_f64())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let message = message_from_row(row)?;
                let receipt: Uuid = row
                    .try_get("receipt")
                    .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;
                let receive_count: i32 = row
                    .try_get("receive_count")
                    .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;
                Ok(Delivery {
                    message,
                    receipt,
                    receive_count: receive_count.max(0) as u32,
                })
            })
            .collect()
    }

    #[instrument(skip(self, delivery), fields(message_id = %delivery.message.message_id))]
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let result = sqlx::query(
            "DELETE FROM ingest_queue WHERE message_id = $1 AND receipt = $2",
        )
        .bind(delivery.message.message_id)
        .bind(delivery.receipt)
        .execute(&self.pool)
        .await
        .map_err(|e| QueueError::AckFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            // Stale receipt: the message was redelivered (or dead-lettered)
            // since this delivery. The newer holder owns it now.
            debug!("Ack matched no row, receipt is stale");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn dead_letters(&self) -> Result<Vec<IngestMessage>, QueueError> {
        let rows = sqlx::query(
            r#"
            SELECT message_id, job_id, session_id, document_id, storage_path, enqueued_at
            FROM ingest_dead_letters
            ORDER BY dead_lettered_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn redrive(&self, message_id: Uuid) -> Result<(), QueueError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        let row = sqlx::query(
            r#"
            DELETE FROM ingest_dead_letters
            WHERE message_id = $1
            RETURNING message_id, job_id, session_id, document_id, storage_path, enqueued_at
            "#,
        )
        .bind(message_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| QueueError::ReceiveFailed(e.to_string()))?;

        let Some(row) = row else {
            return Err(QueueError::NotFound(message_id));
        };
        let message = message_from_row(&row)?;

        sqlx::query(
            r#"
            INSERT INTO ingest_queue (message_id, job_id, session_id, document_id, storage_path, enqueued_at, visible_at, receive_count)
            VALUES ($1, $2, $3, $4, $5, $6, now(), 0)
            "#,
        )
        .bind(message.message_id)
        .bind(message.job_id.as_uuid())
        .bind(message.session_id.as_uuid())
        .bind(message.document_id.as_uuid())
        .bind(message.storage_path.as_str())
        .bind(message.enqueued_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| QueueError::EnqueueFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| QueueError::EnqueueFailed(e.to_string()))?;

        info!(message_id = %message_id, "Dead-lettered message redriven");
        Ok(())
    }
}
