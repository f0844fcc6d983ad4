use tawau::application::ports::{VectorFilter, VectorIndex, VectorIndexError};
use tawau::domain::{ChunkId, DocumentId, Embedding, SessionId, VectorRecord};
use tawau::infrastructure::persistence::InMemoryVectorIndex;

fn record(
    session_id: SessionId,
    document_id: DocumentId,
    position: u32,
    text: &str,
    values: Vec<f32>,
) -> VectorRecord {
    VectorRecord {
        id: ChunkId::derive("source", position, text),
        embedding: Embedding::new(values),
        session_id,
        document_id,
        position,
        text: text.to_string(),
    }
}

#[tokio::test]
async fn given_same_records_when_upserted_twice_then_index_state_converges() {
    let index = InMemoryVectorIndex::new();
    let session_id = SessionId::new();
    let document_id = DocumentId::new();
    let records = vec![
        record(session_id, document_id, 0, "alpha", vec![1.0, 0.0]),
        record(session_id, document_id, 1, "beta", vec![0.0, 1.0]),
    ];

    index.upsert(&records).await.unwrap();
    index.upsert(&records).await.unwrap();

    assert_eq!(index.len(), 2);
    let results = index
        .query(
            &Embedding::new(vec![1.0, 0.0]),
            10,
            &VectorFilter::session(session_id),
        )
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, "alpha");
}

#[tokio::test]
async fn given_two_sessions_when_querying_with_session_filter_then_no_cross_session_hits() {
    let index = InMemoryVectorIndex::new();
    let session_a = SessionId::new();
    let session_b = SessionId::new();
    let doc_a = DocumentId::new();
    let doc_b = DocumentId::new();

    index
        .upsert(&[
            record(session_a, doc_a, 0, "a-zero", vec![1.0, 0.0]),
            record(session_b, doc_b, 0, "b-zero", vec![1.0, 0.0]),
        ])
        .await
        .unwrap();

    let results = index
        .query(
            &Embedding::new(vec![1.0, 0.0]),
            10,
            &VectorFilter::session(session_a),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].session_id, session_a);
    assert_eq!(results[0].text, "a-zero");
}

#[tokio::test]
async fn given_document_and_position_filters_when_querying_then_only_matches_return() {
    let index = InMemoryVectorIndex::new();
    let session_id = SessionId::new();
    let doc_a = DocumentId::new();
    let doc_b = DocumentId::new();

    index
        .upsert(&[
            record(session_id, doc_a, 0, "a-zero", vec![1.0, 0.0]),
            record(session_id, doc_a, 1, "a-one", vec![1.0, 0.0]),
            record(session_id, doc_b, 0, "b-zero", vec![1.0, 0.0]),
        ])
        .await
        .unwrap();

    let by_document = index
        .query(
            &Embedding::new(vec![1.0, 0.0]),
            10,
            &VectorFilter::session(session_id).with_document(doc_a),
        )
        .await
        .unwrap();
    assert_eq!(by_document.len(), 2);

    let by_position = index
        .query(
            &Embedding::new(vec![1.0, 0.0]),
            10,
            &VectorFilter {
                session_id: Some(session_id),
                document_id: Some(doc_a),
                position: Some(1),
            },
        )
        .await
        .unwrap();
    assert_eq!(by_position.len(), 1);
    assert_eq!(by_position[0].text, "a-one");
}

#[tokio::test]
async fn given_ranked_query_when_top_k_applied_then_best_match_leads() {
    let index = InMemoryVectorIndex::new();
    let session_id = SessionId::new();
    let document_id = DocumentId::new();

    index
        .upsert(&[
            record(session_id, document_id, 0, "exact", vec![1.0, 0.0]),
            record(session_id, document_id, 1, "orthogonal", vec![0.0, 1.0]),
            record(session_id, document_id, 2, "diagonal", vec![0.7, 0.7]),
        ])
        .await
        .unwrap();

    let results = index
        .query(
            &Embedding::new(vec![1.0, 0.0]),
            2,
            &VectorFilter::session(session_id),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, "exact");
    assert!(results[0].score >= results[1].score);
}

#[tokio::test]
async fn given_delete_by_document_then_other_documents_survive() {
    let index = InMemoryVectorIndex::new();
    let session_id = SessionId::new();
    let doc_a = DocumentId::new();
    let doc_b = DocumentId::new();

    index
        .upsert(&[
            record(session_id, doc_a, 0, "a-zero", vec![1.0, 0.0]),
            record(session_id, doc_b, 0, "b-zero", vec![1.0, 0.0]),
        ])
        .await
        .unwrap();

    index.delete(&VectorFilter::document(doc_a)).await.unwrap();

    assert_eq!(index.len(), 1);
    let remaining = index
        .query(
            &Embedding::new(vec![1.0, 0.0]),
            10,
            &VectorFilter::session(session_id),
        )
        .await
        .unwrap();
    assert_eq!(remaining[0].document_id, doc_b);
}

#[tokio::test]
async fn given_delete_by_session_then_session_is_emptied() {
    let index = InMemoryVectorIndex::new();
    let session_a = SessionId::new();
    let session_b = SessionId::new();

    index
        .upsert(&[
            record(session_a, DocumentId::new(), 0, "a", vec![1.0, 0.0]),
            record(session_a, DocumentId::new(), 0, "b", vec![0.0, 1.0]),
            record(session_b, DocumentId::new(), 0, "c", vec![1.0, 0.0]),
        ])
        .await
        .unwrap();

    index.delete(&VectorFilter::session(session_a)).await.unwrap();

    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn given_empty_filter_when_deleting_then_refused() {
    let index = InMemoryVectorIndex::new();

    let result = index.delete(&VectorFilter::default()).await;

    assert!(matches!(result, Err(VectorIndexError::DeleteFailed(_))));
}
