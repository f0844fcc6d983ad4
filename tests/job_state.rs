mod common;

use uuid::Uuid;

use tawau::application::ports::{JobRepository, RepositoryError};
use tawau::domain::{
    ContentType, DocumentStatus, Job, JobOutcome, JobStatus, SessionId,
};
use tawau::infrastructure::persistence::InMemoryJobRepository;

use common::make_document;

fn make_job() -> Job {
    let document = make_document(SessionId::new(), ContentType::Text);
    Job::new(document.id, Uuid::new_v4(), "document_ingestion".to_string())
}

#[test]
fn given_status_strings_when_parsed_then_round_trip() {
    for status in [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
    ] {
        assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
    }
    for status in [
        DocumentStatus::Pending,
        DocumentStatus::Processing,
        DocumentStatus::Completed,
        DocumentStatus::Failed,
    ] {
        assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
    }
    assert!("SOMETHING".parse::<JobStatus>().is_err());
}

#[test]
fn given_outcome_when_serialized_then_tagged_by_variant() {
    let success = JobOutcome::Success {
        chunk_count: 12,
        processing_time_ms: 840,
        index_reference: "document_chunks".to_string(),
    };
    let json = serde_json::to_value(&success).unwrap();
    assert_eq!(json["outcome"], "success");
    assert_eq!(json["chunk_count"], 12);

    let failure = JobOutcome::Failure {
        error_type: "content".to_string(),
        error_message: "parse failed".to_string(),
    };
    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["outcome"], "failure");

    let back: JobOutcome = serde_json::from_value(json).unwrap();
    assert_eq!(back, failure);
}

#[tokio::test]
async fn given_running_job_when_progress_reported_out_of_order_then_never_decreases() {
    let jobs = InMemoryJobRepository::new();
    let job = make_job();
    jobs.create(&job).await.unwrap();
    jobs.mark_running(job.id, 10).await.unwrap();

    jobs.set_progress(job.id, 50).await.unwrap();
    jobs.set_progress(job.id, 30).await.unwrap();

    let stored = jobs.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.progress, 50);
}

#[tokio::test]
async fn given_terminal_job_when_progress_reported_then_ignored() {
    let jobs = InMemoryJobRepository::new();
    let job = make_job();
    jobs.create(&job).await.unwrap();
    jobs.mark_running(job.id, 10).await.unwrap();
    jobs.finish(
        job.id,
        JobStatus::Completed,
        &JobOutcome::Success {
            chunk_count: 1,
            processing_time_ms: 5,
            index_reference: "memory".to_string(),
        },
    )
    .await
    .unwrap();

    jobs.set_progress(job.id, 40).await.unwrap();

    let stored = jobs.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.progress, 100);
    assert_eq!(stored.status, JobStatus::Completed);
}

#[tokio::test]
async fn given_job_when_finished_with_non_terminal_status_then_rejected() {
    let jobs = InMemoryJobRepository::new();
    let job = make_job();
    jobs.create(&job).await.unwrap();

    let result = jobs
        .finish(
            job.id,
            JobStatus::Running,
            &JobOutcome::Failure {
                error_type: "content".to_string(),
                error_message: "nope".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
async fn given_failed_job_when_re_run_then_outcome_clears_while_running() {
    let jobs = InMemoryJobRepository::new();
    let job = make_job();
    jobs.create(&job).await.unwrap();
    jobs.mark_running(job.id, 10).await.unwrap();
    jobs.finish(
        job.id,
        JobStatus::Failed,
        &JobOutcome::Failure {
            error_type: "transient_provider".to_string(),
            error_message: "embedding provider unavailable".to_string(),
        },
    )
    .await
    .unwrap();

    // Redelivery re-runs the job: outcome must be empty while Running.
    jobs.mark_running(job.id, 10).await.unwrap();

    let stored = jobs.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Running);
    assert!(stored.outcome.is_none());
    assert_eq!(stored.progress, 10);
}

#[tokio::test]
async fn given_duplicate_correlation_id_when_created_then_constraint_violation() {
    let jobs = InMemoryJobRepository::new();
    let correlation_id = Uuid::new_v4();
    let document = make_document(SessionId::new(), ContentType::Text);

    let first = Job::new(document.id, correlation_id, "document_ingestion".to_string());
    let second = Job::new(document.id, correlation_id, "document_ingestion".to_string());

    jobs.create(&first).await.unwrap();
    let result = jobs.create(&second).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}
