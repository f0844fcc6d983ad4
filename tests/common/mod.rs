//! Shared fixtures: in-memory wiring for the pipeline, worker and gateway,
//! plus a switchable embedder and an upsert-counting index wrapper.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tawau::application::ports::{
    CollectionConfig, DocumentRepository, Embedder, EmbedderError, IngestMessage, JobQueue,
    JobRepository, QueueConfig, QueueError, SearchResult, VectorFilter, VectorIndex,
    VectorIndexError,
};
use tawau::application::services::{
    IngestionGateway, IngestionPipeline, IngestionWorker, PipelineConfig, WorkerConfig,
};
use tawau::domain::{
    ContentType, Document, Embedding, SessionId, StoragePath, VectorRecord,
};
use tawau::infrastructure::llm::HashEmbedder;
use tawau::infrastructure::persistence::{
    InMemoryDocumentRepository, InMemoryJobRepository, InMemoryVectorIndex,
};
use tawau::infrastructure::queue::InMemoryQueue;
use tawau::infrastructure::storage::InMemoryStagingStore;
use tawau::infrastructure::text_processing::{CompositeParser, FixedSizeSplitter, PdfAdapter, PlainTextAdapter};

pub const EMBEDDING_DIMENSIONS: usize = 64;
pub const CHUNK_SIZE: usize = 64;
pub const CHUNK_OVERLAP: usize = 8;

/// Embedder that can be flipped into a failing state to simulate a provider
/// outage.
pub struct SwitchableEmbedder {
    inner: HashEmbedder,
    failing: AtomicBool,
}

impl SwitchableEmbedder {
    pub fn new() -> Self {
        Self {
            inner: HashEmbedder::new(EMBEDDING_DIMENSIONS),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Embedder for SwitchableEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbedderError::ApiRequestFailed(
                "embedding provider unavailable".to_string(),
            ));
        }
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbedderError::ApiRequestFailed(
                "embedding provider unavailable".to_string(),
            ));
        }
        self.inner.embed_batch(texts).await
    }
}

/// Counts upsert calls so stage-isolation tests can assert the indexer was
/// never reached.
pub struct CountingIndex {
    inner: InMemoryVectorIndex,
    upsert_calls: AtomicUsize,
}

impl CountingIndex {
    pub fn new() -> Self {
        Self {
            inner: InMemoryVectorIndex::new(),
            upsert_calls: AtomicUsize::new(0),
        }
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl VectorIndex for CountingIndex {
    async fn ensure_collection(&self, config: &CollectionConfig) -> Result<bool, VectorIndexError> {
        self.inner.ensure_collection(config).await
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), VectorIndexError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(records).await
    }

    async fn query(
        &self,
        embedding: &Embedding,
        top_k: usize,
        filter: &VectorFilter,
    ) -> Result<Vec<SearchResult>, VectorIndexError> {
        self.inner.query(embedding, top_k, filter).await
    }

    async fn delete(&self, filter: &VectorFilter) -> Result<(), VectorIndexError> {
        self.inner.delete(filter).await
    }

    fn reference(&self) -> String {
        self.inner.reference()
    }
}

/// Queue that rejects every enqueue, for the gateway compensation test.
pub struct RejectingQueue;

#[async_trait]
impl JobQueue for RejectingQueue {
    async fn enqueue(&self, _message: &IngestMessage) -> Result<(), QueueError> {
        Err(QueueError::EnqueueFailed("queue unavailable".to_string()))
    }

    async fn receive(&self, _batch_size: usize) -> Result<Vec<tawau::application::ports::Delivery>, QueueError> {
        Ok(Vec::new())
    }

    async fn ack(&self, _delivery: &tawau::application::ports::Delivery) -> Result<(), QueueError> {
        Ok(())
    }

    async fn dead_letters(&self) -> Result<Vec<IngestMessage>, QueueError> {
        Ok(Vec::new())
    }

    async fn redrive(&self, _message_id: Uuid) -> Result<(), QueueError> {
        Err(QueueError::NotFound(_message_id))
    }
}

pub type TestPipeline = IngestionPipeline<CompositeParser, CountingIndex, FixedSizeSplitter>;
pub type TestWorker = IngestionWorker<CompositeParser, CountingIndex, FixedSizeSplitter>;

/// Everything wired against the in-memory adapters.
pub struct Harness {
    pub jobs: Arc<InMemoryJobRepository>,
    pub documents: Arc<InMemoryDocumentRepository>,
    pub queue: Arc<InMemoryQueue>,
    pub staging: Arc<InMemoryStagingStore>,
    pub index: Arc<CountingIndex>,
    pub embedder: Arc<SwitchableEmbedder>,
    pub pipeline: Arc<TestPipeline>,
    pub worker: TestWorker,
    pub gateway: IngestionGateway,
}

impl Harness {
    pub fn new(queue_config: QueueConfig) -> Self {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let queue = Arc::new(InMemoryQueue::new(queue_config));
        let staging = Arc::new(InMemoryStagingStore::new());
        let index = Arc::new(CountingIndex::new());
        let embedder = Arc::new(SwitchableEmbedder::new());

        let parser = Arc::new(CompositeParser::new(
            Arc::new(PlainTextAdapter),
            Arc::new(PdfAdapter::new()),
        ));
        let splitter = Arc::new(FixedSizeSplitter::new(CHUNK_SIZE, CHUNK_OVERLAP));

        let pipeline = Arc::new(IngestionPipeline::new(
            staging.clone(),
            parser,
            splitter,
            embedder.clone(),
            index.clone(),
            PipelineConfig::default(),
        ));

        let worker = IngestionWorker::new(
            queue.clone(),
            jobs.clone(),
            documents.clone(),
            pipeline.clone(),
            WorkerConfig {
                retry_backoff: Duration::from_millis(1),
                ..WorkerConfig::default()
            },
        );

        let gateway = IngestionGateway::new(documents.clone(), jobs.clone(), queue.clone());

        Self {
            jobs,
            documents,
            queue,
            staging,
            index,
            embedder,
            pipeline,
            worker,
            gateway,
        }
    }

    /// Default queue settings for worker tests: immediate redelivery,
    /// three-receive budget.
    pub fn with_immediate_redelivery() -> Self {
        Self::new(QueueConfig {
            visibility_timeout: Duration::ZERO,
            max_receive_count: 3,
        })
    }

    /// Stages a plain-text document and enqueues its ingestion via the
    /// gateway; returns the staged document.
    pub async fn enqueue_text_document(
        &self,
        session_id: SessionId,
        name: &str,
        body: &[u8],
    ) -> Document {
        let storage_path = StoragePath::new(&session_id, &Uuid::new_v4(), name);
        self.staging.put(&storage_path, body.to_vec());

        let job_id = self
            .gateway
            .enqueue(
                storage_path,
                session_id,
                name.to_string(),
                ContentType::Text,
            )
            .await
            .expect("enqueue failed");

        let job = self
            .jobs
            .get_by_id(job_id)
            .await
            .expect("job lookup failed")
            .expect("job missing");
        self.documents
            .get_by_id(job.document_id)
            .await
            .expect("document lookup failed")
            .expect("document missing")
    }

    /// Same, but with PDF content-type so garbage bytes hit the PDF parser.
    pub async fn enqueue_pdf_document(
        &self,
        session_id: SessionId,
        name: &str,
        body: &[u8],
    ) -> Document {
        let storage_path = StoragePath::new(&session_id, &Uuid::new_v4(), name);
        self.staging.put(&storage_path, body.to_vec());

        let job_id = self
            .gateway
            .enqueue(storage_path, session_id, name.to_string(), ContentType::Pdf)
            .await
            .expect("enqueue failed");

        let job = self
            .jobs
            .get_by_id(job_id)
            .await
            .expect("job lookup failed")
            .expect("job missing");
        self.documents
            .get_by_id(job.document_id)
            .await
            .expect("document lookup failed")
            .expect("document missing")
    }

    /// Polls until the queue stops handing out deliveries, with a bound so a
    /// permanently-retrying message cannot loop forever.
    pub async fn drain(&self, max_polls: usize) {
        for _ in 0..max_polls {
            let handled = self.worker.poll_once().await.expect("receive failed");
            if handled == 0 {
                break;
            }
        }
    }
}

pub fn make_document(session_id: SessionId, content_type: ContentType) -> Document {
    Document::new(
        session_id,
        "notes.txt".to_string(),
        content_type,
        StoragePath::new(&session_id, &Uuid::new_v4(), "notes.txt"),
    )
}

pub fn make_message(document: &Document) -> IngestMessage {
    IngestMessage {
        message_id: Uuid::new_v4(),
        job_id: tawau::domain::JobId::new(),
        session_id: document.session_id,
        document_id: document.id,
        storage_path: document.storage_path.clone(),
        enqueued_at: Utc::now(),
    }
}

pub const THREE_PAGE_TEXT: &str = "Shipping manifests list every container that crossed the terminal in March. \
The reconciliation team compares the manifests against customs declarations each week. \
Any mismatch above the tolerance threshold is flagged for manual review by the auditors. \
Flagged entries carry the vessel name, the berth number and the inspecting officer. \
Quarterly summaries roll the weekly findings up into a report for the port authority.";
