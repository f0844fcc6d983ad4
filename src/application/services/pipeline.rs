use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::application::ports::{
    DocumentParser, Embedder, EmbedderError, ParserError, ProgressSink, StagingStore,
    StagingStoreError, TextSplitter, TextSplitterError, VectorIndex, VectorIndexError,
};
use crate::domain::{Chunk, Document, DocumentId, VectorRecord};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Texts per embedding-provider call.
    pub embed_batch_size: usize,
    pub fetch_timeout: Duration,
    pub embed_timeout: Duration,
    pub index_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            embed_batch_size: 64,
            fetch_timeout: Duration::from_secs(15),
            embed_timeout: Duration::from_secs(30),
            index_timeout: Duration::from_secs(30),
        }
    }
}

/// What a successful run produced; becomes the job's Success outcome.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub chunk_count: usize,
    pub processing_time_ms: u64,
    pub index_reference: String,
}

/// Sequences fetch → parse → chunk → embed → index for one document.
///
/// Each stage is independently retryable and wraps its own typed error; a
/// failure short-circuits the remaining stages. The whole run is idempotent:
/// chunk ids are deterministic and index writes are upserts, so a replay of
/// the same input converges on the same index state.
pub struct IngestionPipeline<P: ?Sized, V, S: ?Sized>
where
    P: DocumentParser,
    V: VectorIndex,
    S: TextSplitter,
{
    staging: Arc<dyn StagingStore>,
    parser: Arc<P>,
    splitter: Arc<S>,
    embedder: Arc<dyn Embedder>,
    index: Arc<V>,
    config: PipelineConfig,
}

impl<P: ?Sized, V, S: ?Sized> IngestionPipeline<P, V, S>
where
    P: DocumentParser,
    V: VectorIndex,
    S: TextSplitter,
{
    pub fn new(
        staging: Arc<dyn StagingStore>,
        parser: Arc<P>,
        splitter: Arc<S>,
        embedder: Arc<dyn Embedder>,
        index: Arc<V>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            staging,
            parser,
            splitter,
            embedder,
            index,
            config,
        }
    }

    #[tracing::instrument(
        skip(self, document, progress),
        fields(document_id = %document.id, storage_path = %document.storage_path)
    )]
    pub async fn process(
        &self,
        document: &Document,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();
        let document_id = document.id;

        let data = timeout(
            self.config.fetch_timeout,
            self.staging.fetch(&document.storage_path),
        )
        .await
        .map_err(|_| PipelineError::Fetch {
            document_id,
            source: StagingStoreError::Timeout(self.config.fetch_timeout),
        })?
        .map_err(|source| PipelineError::Fetch {
            document_id,
            source,
        })?;
        progress.report(20).await;

        let segments = self
            .parser
            .parse(&data, document)
            .await
            .map_err(|source| PipelineError::Parse {
                document_id,
                source,
            })?;
        progress.report(35).await;

        if segments.is_empty() {
            tracing::info!("Document parsed to zero segments, nothing to index");
            return Ok(PipelineReport {
                chunk_count: 0,
                processing_time_ms: started.elapsed().as_millis() as u64,
                index_reference: self.index.reference(),
            });
        }

        let mut chunks = self
            .splitter
            .split(&segments, document)
            .await
            .map_err(|source| PipelineError::Split {
                document_id,
                source,
            })?;
        progress.report(50).await;

        let records = self.embed(&mut chunks, document_id).await?;
        progress.report(75).await;

        if !records.is_empty() {
            timeout(self.config.index_timeout, self.index.upsert(&records))
                .await
                .map_err(|_| PipelineError::Index {
                    document_id,
                    source: VectorIndexError::Timeout(self.config.index_timeout),
                })?
                .map_err(|source| PipelineError::Index {
                    document_id,
                    source,
                })?;
        }
        progress.report(90).await;

        let report = PipelineReport {
            chunk_count: chunks.len(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            index_reference: self.index.reference(),
        };
        tracing::info!(
            chunk_count = report.chunk_count,
            processing_time_ms = report.processing_time_ms,
            "Pipeline run completed"
        );
        Ok(report)
    }

    /// Embeds chunks in provider-sized batches, populating each chunk's
    /// embedding and building the index records alongside.
    async fn embed(
        &self,
        chunks: &mut [Chunk],
        document_id: DocumentId,
    ) -> Result<Vec<VectorRecord>, PipelineError> {
        let mut records = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks_mut(self.config.embed_batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let embeddings = timeout(self.config.embed_timeout, self.embedder.embed_batch(&texts))
                .await
                .map_err(|_| PipelineError::Embed {
                    document_id,
                    source: EmbedderError::Timeout(self.config.embed_timeout),
                })?
                .map_err(|source| PipelineError::Embed {
                    document_id,
                    source,
                })?;

            if embeddings.len() != batch.len() {
                return Err(PipelineError::Embed {
                    document_id,
                    source: EmbedderError::InvalidResponse(format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        embeddings.len()
                    )),
                });
            }

            for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
                records.push(VectorRecord {
                    id: chunk.id,
                    embedding: embedding.clone(),
                    session_id: chunk.session_id,
                    document_id: chunk.document_id,
                    position: chunk.position,
                    text: chunk.text.clone(),
                });
                chunk.embedding = Some(embedding);
            }
        }

        Ok(records)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("fetch failed for document {document_id}: {source}")]
    Fetch {
        document_id: DocumentId,
        #[source]
        source: StagingStoreError,
    },
    #[error("parse failed for document {document_id}: {source}")]
    Parse {
        document_id: DocumentId,
        #[source]
        source: ParserError,
    },
    #[error("chunking failed for document {document_id}: {source}")]
    Split {
        document_id: DocumentId,
        #[source]
        source: TextSplitterError,
    },
    #[error("embedding failed for document {document_id}: {source}")]
    Embed {
        document_id: DocumentId,
        #[source]
        source: EmbedderError,
    },
    #[error("index write failed for document {document_id}: {source}")]
    Index {
        document_id: DocumentId,
        #[source]
        source: VectorIndexError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch { .. } => "fetch",
            PipelineError::Parse { .. } => "parse",
            PipelineError::Split { .. } => "chunk",
            PipelineError::Embed { .. } => "embed",
            PipelineError::Index { .. } => "index",
        }
    }

    /// Error class recorded in the job's Failure outcome.
    pub fn error_type(&self) -> &'static str {
        match self {
            PipelineError::Fetch {
                source: StagingStoreError::NotFound(_),
                ..
            } => "content",
            PipelineError::Parse { .. } => "content",
            PipelineError::Split { .. } => "validation",
            PipelineError::Fetch { .. } | PipelineError::Embed { .. } | PipelineError::Index { .. } => {
                "transient_provider"
            }
        }
    }

    /// Whether redelivering the message can change the result. Content and
    /// validation errors cannot; provider and storage errors can.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Fetch {
                source: StagingStoreError::NotFound(_),
                ..
            } => false,
            PipelineError::Fetch { .. } => true,
            PipelineError::Parse { .. } | PipelineError::Split { .. } => false,
            PipelineError::Embed { .. } | PipelineError::Index { .. } => true,
        }
    }
}
