mod common;

use tawau::application::ports::{Embedder, NoopProgress, VectorFilter, VectorIndex};
use tawau::application::services::PipelineError;
use tawau::domain::{ContentType, SessionId};

use common::Harness;

#[tokio::test]
async fn given_staged_text_document_when_processed_then_chunks_are_indexed() {
    let harness = Harness::with_immediate_redelivery();
    let session_id = SessionId::new();
    let document = common::make_document(session_id, ContentType::Text);
    harness
        .staging
        .put(&document.storage_path, common::THREE_PAGE_TEXT.as_bytes().to_vec());

    let report = harness
        .pipeline
        .process(&document, &NoopProgress)
        .await
        .unwrap();

    assert!(report.chunk_count > 0);
    assert_eq!(harness.index.len(), report.chunk_count);
    assert_eq!(report.index_reference, "memory");

    let query_embedding = harness
        .embedder
        .embed(common::THREE_PAGE_TEXT)
        .await
        .unwrap();
    let results = harness
        .index
        .query(&query_embedding, 3, &VectorFilter::session(session_id))
        .await
        .unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.session_id == session_id));
}

#[tokio::test]
async fn given_unparseable_pdf_when_processed_then_content_error_and_no_index_writes() {
    let harness = Harness::with_immediate_redelivery();
    let document = common::make_document(SessionId::new(), ContentType::Pdf);
    harness
        .staging
        .put(&document.storage_path, b"definitely not a pdf".to_vec());

    let error = harness
        .pipeline
        .process(&document, &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::Parse { .. }));
    assert_eq!(error.error_type(), "content");
    assert_eq!(error.stage(), "parse");
    assert!(!error.is_retryable());
    assert_eq!(harness.index.upsert_calls(), 0);
    assert_eq!(harness.index.len(), 0);
}

#[tokio::test]
async fn given_missing_staged_object_when_processed_then_content_error() {
    let harness = Harness::with_immediate_redelivery();
    let document = common::make_document(SessionId::new(), ContentType::Text);
    // Nothing staged under the document's locator.

    let error = harness
        .pipeline
        .process(&document, &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::Fetch { .. }));
    assert_eq!(error.error_type(), "content");
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn given_embedding_outage_when_processed_then_retryable_error_and_indexer_never_invoked() {
    let harness = Harness::with_immediate_redelivery();
    let document = common::make_document(SessionId::new(), ContentType::Text);
    harness
        .staging
        .put(&document.storage_path, common::THREE_PAGE_TEXT.as_bytes().to_vec());
    harness.embedder.set_failing(true);

    let error = harness
        .pipeline
        .process(&document, &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::Embed { .. }));
    assert_eq!(error.error_type(), "transient_provider");
    assert_eq!(error.stage(), "embed");
    assert!(error.is_retryable());
    assert_eq!(harness.index.upsert_calls(), 0);
}

#[tokio::test]
async fn given_document_with_no_extractable_text_when_processed_then_completes_with_zero_chunks() {
    let harness = Harness::with_immediate_redelivery();
    let document = common::make_document(SessionId::new(), ContentType::Text);
    harness.staging.put(&document.storage_path, b"   \n\n  ".to_vec());

    let report = harness
        .pipeline
        .process(&document, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(report.chunk_count, 0);
    assert_eq!(harness.index.len(), 0);
    assert_eq!(harness.index.upsert_calls(), 0);
}

#[tokio::test]
async fn given_same_document_when_processed_twice_then_index_converges() {
    let harness = Harness::with_immediate_redelivery();
    let document = common::make_document(SessionId::new(), ContentType::Text);
    harness
        .staging
        .put(&document.storage_path, common::THREE_PAGE_TEXT.as_bytes().to_vec());

    let first = harness
        .pipeline
        .process(&document, &NoopProgress)
        .await
        .unwrap();
    let second = harness
        .pipeline
        .process(&document, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(first.chunk_count, second.chunk_count);
    assert_eq!(harness.index.len(), first.chunk_count);
    assert_eq!(harness.index.upsert_calls(), 2);
}
