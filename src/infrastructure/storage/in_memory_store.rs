use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Map-backed staging store for tests and local development.
#[derive(Default)]
pub struct InMemoryStagingStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object without going through the streaming path.
    pub fn put(&self, path: &StoragePath, data: Vec<u8>) {
        let mut objects = self.objects.lock().expect("staging lock poisoned");
        objects.insert(path.as_str().to_string(), data);
    }
}

#[async_trait::async_trait]
impl StagingStore for InMemoryStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, StagingStoreError> {
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk.map_err(StagingStoreError::Io)?);
        }
        let total = buffer.len() as u64;
        self.put(path, buffer);
        Ok(total)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, StagingStoreError> {
        let objects = self.objects.lock().expect("staging lock poisoned");
        objects
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| StagingStoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        let mut objects = self.objects.lock().expect("staging lock poisoned");
        objects.remove(path.as_str());
        Ok(())
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, StagingStoreError> {
        let objects = self.objects.lock().expect("staging lock poisoned");
        objects
            .get(path.as_str())
            .map(|data| data.len() as u64)
            .ok_or_else(|| StagingStoreError::NotFound(path.to_string()))
    }
}
