mod common;

use std::sync::Arc;

use uuid::Uuid;

use tawau::application::ports::{DocumentRepository, JobQueue, JobRepository};
use tawau::application::services::{GatewayError, IngestionGateway};
use tawau::domain::{ContentType, DocumentStatus, JobOutcome, JobStatus, SessionId, StoragePath};
use tawau::infrastructure::persistence::{InMemoryDocumentRepository, InMemoryJobRepository};

use common::{Harness, RejectingQueue};

#[tokio::test]
async fn given_upload_when_enqueued_then_pending_rows_and_one_message_exist() {
    let harness = Harness::with_immediate_redelivery();
    let session_id = SessionId::new();
    let storage_path = StoragePath::new(&session_id, &Uuid::new_v4(), "notes.txt");
    harness.staging.put(&storage_path, b"hello".to_vec());

    let job_id = harness
        .gateway
        .enqueue(
            storage_path.clone(),
            session_id,
            "notes.txt".to_string(),
            ContentType::Text,
        )
        .await
        .unwrap();

    let job = harness.jobs.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.progress, 0);
    assert!(job.outcome.is_none());
    assert_eq!(job.job_type, "document_ingestion");

    let document = harness
        .documents
        .get_by_id(job.document_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(document.status, DocumentStatus::Pending);
    assert_eq!(document.session_id, session_id);
    assert_eq!(document.storage_path, storage_path);

    assert_eq!(harness.queue.len(), 1);
    let delivery = harness.queue.receive(1).await.unwrap().remove(0);
    assert_eq!(delivery.message.message_id, job.correlation_id);
    assert_eq!(delivery.message.job_id, job.id);
    assert_eq!(delivery.message.document_id, document.id);
}

#[tokio::test]
async fn given_queue_outage_when_enqueued_then_job_and_document_fail_synchronously() {
    let documents = Arc::new(InMemoryDocumentRepository::new());
    let jobs = Arc::new(InMemoryJobRepository::new());
    let gateway = IngestionGateway::new(
        documents.clone(),
        jobs.clone(),
        Arc::new(RejectingQueue),
    );
    let session_id = SessionId::new();
    let storage_path = StoragePath::new(&session_id, &Uuid::new_v4(), "notes.txt");

    let result = gateway
        .enqueue(
            storage_path,
            session_id,
            "notes.txt".to_string(),
            ContentType::Text,
        )
        .await;

    assert!(matches!(result, Err(GatewayError::Enqueue(_))));

    // No orphaned Pending job: the failed enqueue is recorded on the rows.
    let failed_jobs = jobs.list_by_status(JobStatus::Failed).await.unwrap();
    assert_eq!(failed_jobs.len(), 1);
    match failed_jobs[0].outcome.clone().unwrap() {
        JobOutcome::Failure { error_type, .. } => assert_eq!(error_type, "enqueue"),
        JobOutcome::Success { .. } => panic!("expected a failure outcome"),
    }
    assert!(jobs.list_by_status(JobStatus::Pending).await.unwrap().is_empty());

    let documents = documents.list_by_session(session_id).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].status, DocumentStatus::Failed);
}

#[tokio::test]
async fn given_two_uploads_when_enqueued_then_correlation_ids_are_unique() {
    let harness = Harness::with_immediate_redelivery();
    let session_id = SessionId::new();

    let first = harness
        .enqueue_text_document(session_id, "a.txt", b"first body")
        .await;
    let second = harness
        .enqueue_text_document(session_id, "b.txt", b"second body")
        .await;
    assert_ne!(first.id, second.id);

    let pending = harness.jobs.list_by_status(JobStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_ne!(pending[0].correlation_id, pending[1].correlation_id);
    assert_eq!(harness.queue.len(), 2);
}
