mod common;

use tawau::application::ports::{TextSplitter, TextSplitterError};
use tawau::domain::{ChunkId, ContentType, Segment, SessionId};
use tawau::infrastructure::text_processing::FixedSizeSplitter;

use common::{make_document, CHUNK_OVERLAP, CHUNK_SIZE};

fn segments_for(text: &str) -> Vec<Segment> {
    vec![Segment::new(text.to_string(), Some(1), 0)]
}

#[tokio::test]
async fn given_same_input_when_split_twice_then_chunk_id_sets_are_equal() {
    let splitter = FixedSizeSplitter::new(CHUNK_SIZE, CHUNK_OVERLAP);
    let document = make_document(SessionId::new(), ContentType::Text);
    let segments = segments_for(common::THREE_PAGE_TEXT);

    let first = splitter.split(&segments, &document).await.unwrap();
    let second = splitter.split(&segments, &document).await.unwrap();

    let first_ids: std::collections::HashSet<ChunkId> = first.iter().map(|c| c.id).collect();
    let second_ids: std::collections::HashSet<ChunkId> = second.iter().map(|c| c.id).collect();
    assert!(!first_ids.is_empty());
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn given_text_when_split_then_chunks_respect_size_and_carry_lineage() {
    let splitter = FixedSizeSplitter::new(CHUNK_SIZE, CHUNK_OVERLAP);
    let session_id = SessionId::new();
    let document = make_document(session_id, ContentType::Text);
    let segments = segments_for(common::THREE_PAGE_TEXT);

    let chunks = splitter.split(&segments, &document).await.unwrap();

    assert!(chunks.len() > 1);
    for (expected_position, chunk) in chunks.iter().enumerate() {
        assert!(chunk.text.chars().count() <= CHUNK_SIZE);
        assert_eq!(chunk.document_id, document.id);
        assert_eq!(chunk.session_id, session_id);
        assert_eq!(chunk.position, expected_position as u32);
        assert_eq!(chunk.page, Some(1));
        assert!(chunk.embedding.is_none());
    }
}

#[tokio::test]
async fn given_overlap_when_split_then_consecutive_chunks_share_a_tail() {
    let splitter = FixedSizeSplitter::new(20, 5);
    let document = make_document(SessionId::new(), ContentType::Text);
    let segments = segments_for("abcdefghijklmnopqrstuvwxyz0123456789");

    let chunks = splitter.split(&segments, &document).await.unwrap();

    assert!(chunks.len() >= 2);
    let first: Vec<char> = chunks[0].text.chars().collect();
    let second: Vec<char> = chunks[1].text.chars().collect();
    assert_eq!(&first[first.len() - 5..], &second[..5]);
}

#[tokio::test]
async fn given_empty_segment_list_when_split_then_returns_validation_error() {
    let splitter = FixedSizeSplitter::new(CHUNK_SIZE, CHUNK_OVERLAP);
    let document = make_document(SessionId::new(), ContentType::Text);

    let result = splitter.split(&[], &document).await;

    assert!(matches!(result, Err(TextSplitterError::EmptyInput)));
}

#[tokio::test]
async fn given_multiple_segments_when_split_then_positions_run_across_segments() {
    let splitter = FixedSizeSplitter::new(CHUNK_SIZE, CHUNK_OVERLAP);
    let document = make_document(SessionId::new(), ContentType::Text);
    let segments = vec![
        Segment::new("first page body".to_string(), Some(1), 0),
        Segment::new("second page body".to_string(), Some(2), 15),
    ];

    let chunks = splitter.split(&segments, &document).await.unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].position, 0);
    assert_eq!(chunks[1].position, 1);
    assert_eq!(chunks[0].page, Some(1));
    assert_eq!(chunks[1].page, Some(2));
    assert_ne!(chunks[0].id, chunks[1].id);
}

#[test]
fn given_identical_inputs_when_deriving_chunk_ids_then_ids_match() {
    let a = ChunkId::derive("session/doc/notes.txt", 3, "some chunk text");
    let b = ChunkId::derive("session/doc/notes.txt", 3, "some chunk text");
    assert_eq!(a, b);
}

#[test]
fn given_different_position_when_deriving_chunk_ids_then_ids_differ() {
    let a = ChunkId::derive("session/doc/notes.txt", 3, "some chunk text");
    let b = ChunkId::derive("session/doc/notes.txt", 4, "some chunk text");
    let c = ChunkId::derive("session/other.txt", 3, "some chunk text");
    assert_ne!(a, b);
    assert_ne!(a, c);
}
