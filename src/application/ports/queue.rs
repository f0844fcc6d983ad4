use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DocumentId, JobId, SessionId, StoragePath};

/// The message the gateway enqueues and the worker consumes.
///
/// `message_id` doubles as the job's correlation id. The message is transient:
/// the job and document rows are the durable projection of its effects.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestMessage {
    pub message_id: Uuid,
    pub job_id: JobId,
    pub session_id: SessionId,
    pub document_id: DocumentId,
    pub storage_path: StoragePath,
    pub enqueued_at: DateTime<Utc>,
}

/// One delivery of a message to a consumer.
///
/// The receipt identifies this particular delivery; an ack with a stale
/// receipt (the message has since been redelivered) is a no-op.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: IngestMessage,
    pub receipt: Uuid,
    pub receive_count: u32,
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// How long a received message stays invisible before it is redelivered.
    /// Must exceed the worst-case pipeline duration with margin.
    pub visibility_timeout: Duration,
    /// Deliveries a message gets before it is routed to the dead-letter
    /// queue instead.
    pub max_receive_count: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::from_secs(120),
            max_receive_count: 3,
        }
    }
}

/// Durable, at-least-once message transport between the gateway and the
/// worker pool.
///
/// A received-but-unacked message becomes visible again after the visibility
/// timeout; consumers must tolerate duplicate deliveries. Messages that
/// exhaust their receive budget land on the dead-letter queue, where they
/// wait for operator inspection and an explicit redrive.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, message: &IngestMessage) -> Result<(), QueueError>;

    async fn receive(&self, batch_size: usize) -> Result<Vec<Delivery>, QueueError>;

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    async fn dead_letters(&self) -> Result<Vec<IngestMessage>, QueueError>;

    /// Moves a dead-lettered message back onto the main queue with a fresh
    /// receive budget.
    async fn redrive(&self, message_id: Uuid) -> Result<(), QueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("enqueue failed: {0}")]
    EnqueueFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
    #[error("ack failed: {0}")]
    AckFailed(String),
    #[error("message not found: {0}")]
    NotFound(Uuid),
}
