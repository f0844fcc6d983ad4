//! Tawau: asynchronous document ingestion into a session-scoped vector index.
//!
//! Uploads are staged and enqueued by a thin gateway; a worker pool drains
//! the durable, at-least-once queue and runs each document through
//! parse → chunk → embed → index. Job and document rows in the relational
//! store are the source of truth for lifecycle state and what the polling
//! surface reads. Correctness under redelivery rests on idempotency:
//! deterministic chunk ids, upsert-keyed index writes, and a completed-job
//! short-circuit in the worker.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
