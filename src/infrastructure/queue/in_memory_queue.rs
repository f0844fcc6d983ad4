//! In-memory [`JobQueue`] with the same at-least-once semantics as the
//! Postgres queue: visibility timeout, receive counts, dead-lettering and
//! redrive. Used by tests and local development.

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::{
    Delivery, IngestMessage, JobQueue, QueueConfig, QueueError,
};

struct QueuedMessage {
    message: IngestMessage,
    receive_count: u32,
    visible_at: Instant,
    receipt: Option<Uuid>,
}

#[derive(Default)]
struct QueueState {
    messages: Vec<QueuedMessage>,
    dead_letters: Vec<IngestMessage>,
}

pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    config: QueueConfig,
}

impl InMemoryQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            config,
        }
    }

    /// Messages currently on the main queue, visible or not.
    pub fn len(&self) -> usize {
        self.state.lock().expect("queue lock poisoned").messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn enqueue(&self, message: &IngestMessage) -> Result<(), QueueError> {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.messages.push(QueuedMessage {
            message: message.clone(),
            receive_count: 0,
            visible_at: Instant::now(),
            receipt: None,
        });
        Ok(())
    }

    async fn receive(&self, batch_size: usize) -> Result<Vec<Delivery>, QueueError> {
        let mut state = self.state.lock().expect("queue lock poisoned");
        let now = Instant::now();
        let max_receive_count = self.config.max_receive_count;

        // Sweep due messages with a spent budget into the DLQ first, exactly
        // like the Postgres implementation.
        let mut index = 0;
        while index < state.messages.len() {
            let due = state.messages[index].visible_at <= now;
            let exhausted = state.messages[index].receive_count >= max_receive_count;
            if due && exhausted {
                let queued = state.messages.remove(index);
                tracing::warn!(
                    message_id = %queued.message.message_id,
                    receive_count = queued.receive_count,
                    "Message dead-lettered"
                );
                state.dead_letters.push(queued.message);
            } else {
                index += 1;
            }
        }

        let mut deliveries = Vec::new();
        for queued in state.messages.iter_mut() {
            if deliveries.len() >= batch_size {
                break;
            }
            if queued.visible_at > now {
                continue;
            }
            queued.receive_count += 1;
            queued.visible_at = now + self.config.visibility_timeout;
            let receipt = Uuid::new_v4();
            queued.receipt = Some(receipt);
            deliveries.push(Delivery {
                message: queued.message.clone(),
                receipt,
                receive_count: queued.receive_count,
            });
        }

        Ok(deliveries)
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.messages.retain(|queued| {
            !(queued.message.message_id == delivery.message.message_id
                && queued.receipt == Some(delivery.receipt))
        });
        Ok(())
    }

    async fn dead_letters(&self) -> Result<Vec<IngestMessage>, QueueError> {
        let state = self.state.lock().expect("queue lock poisoned");
        Ok(state.dead_letters.clone())
    }

    async fn redrive(&self, message_id: Uuid) -> Result<(), QueueError> {
        let mut state = self.state.lock().expect("queue lock poisoned");
        let position = state
            .dead_letters
            .iter()
            .position(|m| m.message_id == message_id)
            .ok_or(QueueError::NotFound(message_id))?;
        let message = state.dead_letters.remove(position);
        state.messages.push(QueuedMessage {
            message,
            receive_count: 0,
            visible_at: Instant::now(),
            receipt: None,
        });
        Ok(())
    }
}
