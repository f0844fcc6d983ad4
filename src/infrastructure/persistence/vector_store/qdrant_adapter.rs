use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, DeletePointsBuilder,
    Distance, FieldType, Filter, PointId, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder, VectorsConfig,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::ports::{
    CollectionConfig, DistanceMetric, PayloadFieldType, SearchResult, VectorFilter, VectorIndex,
    VectorIndexError,
};
use crate::domain::{ChunkId, DocumentId, Embedding, SessionId, VectorRecord};

pub struct QdrantAdapter {
    client: Arc<Qdrant>,
    collection_name: String,
}

impl QdrantAdapter {
    pub async fn new(url: &str, collection_name: String) -> Result<Self, VectorIndexError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorIndexError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            collection_name,
        })
    }

    pub fn with_client(client: Arc<Qdrant>, collection_name: String) -> Self {
        Self {
            client,
            collection_name,
        }
    }

    fn map_distance_metric(metric: &DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
        }
    }

    fn map_field_type(field_type: &PayloadFieldType) -> FieldType {
        match field_type {
            PayloadFieldType::Keyword => FieldType::Keyword,
            PayloadFieldType::Integer => FieldType::Integer,
            PayloadFieldType::Float => FieldType::Float,
            PayloadFieldType::Text => FieldType::Text,
        }
    }

    fn map_filter(filter: &VectorFilter) -> Filter {
        let mut conditions = Vec::new();
        if let Some(session_id) = filter.session_id {
            conditions.push(Condition::matches("session_id", session_id.to_string()));
        }
        if let Some(document_id) = filter.document_id {
            conditions.push(Condition::matches("document_id", document_id.to_string()));
        }
        if let Some(position) = filter.position {
            conditions.push(Condition::matches("position", position as i64));
        }
        Filter::must(conditions)
    }

    async fn collection_exists(&self) -> Result<bool, VectorIndexError> {
        self.client
            .collection_exists(&self.collection_name)
            .await
            .map_err(|e| VectorIndexError::ConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl VectorIndex for QdrantAdapter {
    #[instrument(skip(self, config), fields(collection = %self.collection_name))]
    async fn ensure_collection(&self, config: &CollectionConfig) -> Result<bool, VectorIndexError> {
        if self.collection_exists().await? {
            info!(collection = %self.collection_name, "collection already exists");
            return Ok(false);
        }

        let vectors_config = VectorsConfig::from(VectorParamsBuilder::new(
            config.vector_dimensions,
            Self::map_distance_metric(&config.distance_metric),
        ));

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection_name).vectors_config(vectors_config),
            )
            .await
            .map_err(|e| VectorIndexError::CollectionCreationFailed(e.to_string()))?;

        info!(collection = %self.collection_name, "collection_created");

        for index in &config.payload_indexes {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    &self.collection_name,
                    &index.field_name,
                    Self::map_field_type(&index.field_type),
                ))
                .await
                .map_err(|e| VectorIndexError::PayloadIndexFailed(e.to_string()))?;

            info!(
                collection = %self.collection_name,
                field = %index.field_name,
                "payload_index_applied"
            );
        }

        Ok(true)
    }

    #[instrument(skip(self, records), fields(collection = %self.collection_name, count = records.len()))]
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), VectorIndexError> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .iter()
            .map(|record| {
                let mut payload: HashMap<String, serde_json::Value> = HashMap::new();
                payload.insert(
                    "session_id".to_string(),
                    serde_json::Value::String(record.session_id.to_string()),
                );
                payload.insert(
                    "document_id".to_string(),
                    serde_json::Value::String(record.document_id.to_string()),
                );
                payload.insert(
                    "position".to_string(),
                    serde_json::Value::Number(record.position.into()),
                );
                payload.insert(
                    "text".to_string(),
                    serde_json::Value::String(record.text.clone()),
                );

                PointStruct::new(
                    PointId::from(record.id.as_uuid().to_string()),
                    record.embedding.values.clone(),
                    payload,
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection_name, points))
            .await
            .map_err(|e| VectorIndexError::UpsertFailed(e.to_string()))?;

        info!(collection = %self.collection_name, count = records.len(), "points_upserted");
        Ok(())
    }

    #[instrument(skip(self, embedding, filter), fields(collection = %self.collection_name, top_k = top_k))]
    async fn query(
        &self,
        embedding: &Embedding,
        top_k: usize,
        filter: &VectorFilter,
    ) -> Result<Vec<SearchResult>, VectorIndexError> {
        let mut builder = SearchPointsBuilder::new(
            &self.collection_name,
            embedding.values.clone(),
            top_k as u64,
        )
        .with_payload(true);

        if !filter.is_empty() {
            builder = builder.filter(Self::map_filter(filter));
        }

        let search_result = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| VectorIndexError::SearchFailed(e.to_string()))?;

        let results: Vec<SearchResult> = search_result
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let session_id_str = payload.get("session_id")?.as_str()?;
                let session_id = SessionId::from_uuid(Uuid::parse_str(session_id_str).ok()?);

                let document_id_str = payload.get("document_id")?.as_str()?;
                let document_id = DocumentId::from_uuid(Uuid::parse_str(document_id_str).ok()?);

                let chunk_id = match point.id?.point_id_options? {
                    qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid) => {
                        ChunkId::from_uuid(Uuid::parse_str(&uuid).ok()?)
                    }
                    qdrant_client::qdrant::point_id::PointIdOptions::Num(_) => return None,
                };

                let text = payload.get("text")?.as_str()?.to_string();
                let position = payload.get("position")?.as_integer()? as u32;

                Some(SearchResult {
                    id: chunk_id,
                    document_id,
                    session_id,
                    position,
                    text,
                    score: point.score,
                })
            })
            .collect();

        Ok(results)
    }

    #[instrument(skip(self, filter), fields(collection = %self.collection_name))]
    async fn delete(&self, filter: &VectorFilter) -> Result<(), VectorIndexError> {
        if filter.is_empty() {
            return Err(VectorIndexError::DeleteFailed(
                "refusing to delete with an empty filter".to_string(),
            ));
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection_name).points(Self::map_filter(filter)),
            )
            .await
            .map_err(|e| VectorIndexError::DeleteFailed(e.to_string()))?;

        info!(collection = %self.collection_name, "points_deleted_by_filter");
        Ok(())
    }

    fn reference(&self) -> String {
        self.collection_name.clone()
    }
}
