use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use tawau::application::ports::{
    CollectionConfig, DocumentParser, Embedder, QueueConfig, TextSplitter, VectorIndex,
};
use tawau::application::services::{
    DocumentService, IngestionGateway, IngestionPipeline, IngestionWorker, PipelineConfig,
    RetrievalService, WorkerConfig,
};
use tawau::infrastructure::llm::{HashEmbedder, OpenAiEmbedder};
use tawau::infrastructure::observability::{init_tracing, TracingConfig};
use tawau::infrastructure::persistence::{
    create_pool, PgDocumentRepository, PgJobRepository, QdrantAdapter,
};
use tawau::infrastructure::queue::PgQueue;
use tawau::infrastructure::storage::LocalStagingStore;
use tawau::infrastructure::text_processing::{
    CompositeParser, FixedSizeSplitter, PdfAdapter, PlainTextAdapter,
};
use tawau::presentation::config::EmbeddingProvider;
use tawau::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    init_tracing(TracingConfig::default(), settings.server.port);

    let pool = create_pool(&settings.database.url, settings.database.max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let document_repository = Arc::new(PgDocumentRepository::new(pool.clone()));
    let job_repository = Arc::new(PgJobRepository::new(pool.clone()));

    let queue_config = QueueConfig {
        visibility_timeout: settings.visibility_timeout(),
        max_receive_count: settings.queue.max_receive_count,
    };
    let queue = Arc::new(PgQueue::new(pool.clone(), queue_config));

    let vector_index = Arc::new(
        QdrantAdapter::new(&settings.qdrant.url, settings.qdrant.collection_name.clone()).await?,
    );
    vector_index
        .ensure_collection(&CollectionConfig::new(
            settings.embeddings.dimension as u64,
        ))
        .await?;

    let staging_store = Arc::new(LocalStagingStore::new(PathBuf::from(
        &settings.staging.root_dir,
    ))?);

    let embedder: Arc<dyn Embedder> = match settings.embeddings.provider {
        EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(
            settings.embeddings.api_key.clone(),
            settings.embeddings.model.clone(),
        )),
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(settings.embeddings.dimension)),
    };

    let parser: Arc<dyn DocumentParser> = Arc::new(CompositeParser::new(
        Arc::new(PlainTextAdapter),
        Arc::new(PdfAdapter::new()),
    ));
    let splitter: Arc<dyn TextSplitter> = Arc::new(FixedSizeSplitter::new(
        settings.chunking.chunk_size,
        settings.chunking.chunk_overlap,
    ));

    let pipeline_config = PipelineConfig {
        embed_batch_size: settings.embeddings.batch_size,
        ..PipelineConfig::default()
    };
    let pipeline = Arc::new(IngestionPipeline::new(
        staging_store.clone(),
        Arc::clone(&parser),
        Arc::clone(&splitter),
        Arc::clone(&embedder),
        Arc::clone(&vector_index),
        pipeline_config,
    ));

    let worker_config = WorkerConfig {
        batch_size: settings.queue.batch_size,
        poll_interval: settings.poll_interval(),
        persistence_retries: settings.worker.persistence_retries,
        retry_backoff: settings.retry_backoff(),
    };
    for _ in 0..settings.worker.concurrency.max(1) {
        let worker = IngestionWorker::new(
            queue.clone(),
            job_repository.clone(),
            document_repository.clone(),
            Arc::clone(&pipeline),
            worker_config.clone(),
        );
        tokio::spawn(worker.run());
    }

    let gateway = Arc::new(IngestionGateway::new(
        document_repository.clone(),
        job_repository.clone(),
        queue.clone(),
    ));
    let retrieval_service = Arc::new(RetrievalService::new(
        Arc::clone(&embedder),
        Arc::clone(&vector_index),
        5,
    ));
    let document_service = Arc::new(DocumentService::new(
        document_repository.clone(),
        Arc::clone(&vector_index),
    ));

    let state = AppState {
        gateway,
        retrieval_service,
        document_service,
        job_repository: job_repository.clone(),
        staging_store: staging_store.clone(),
        queue: queue.clone(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
