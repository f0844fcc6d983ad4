mod in_memory_queue;
mod pg_queue;

pub use in_memory_queue::InMemoryQueue;
pub use pg_queue::PgQueue;
