//! In-process artifact storage.

use crate::{
    ArtifactMetadata, ArtifactReference, ArtifactStore, compute_hash, verify_hash,
};
use std::collections::HashMap;
use std::sync::Arc;
use storytoons_error::{StorageError, StorageErrorKind, StorytoonsResult};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keeps artifacts in memory for the life of the process.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn key(run_id: Uuid, metadata: &ArtifactMetadata) -> String {
        format!("memory://{}/{}", run_id, metadata.slot_name())
    }
}

#[async_trait::async_trait]
impl ArtifactStore for MemoryStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(run_id = %run_id, size = data.len(), kind = %metadata.kind))]
    async fn store(
        &self,
        run_id: Uuid,
        data: &[u8],
        metadata: &ArtifactMetadata,
    ) -> StorytoonsResult<ArtifactReference> {
        let key = Self::key(run_id, metadata);
        let hash = compute_hash(data);
        self.entries.write().await.insert(key.clone(), data.to_vec());

        tracing::debug!(key = %key, "Stored artifact in memory");

        Ok(ArtifactReference {
            run_id,
            content_hash: hash,
            storage_backend: self.backend_name().to_string(),
            storage_path: key,
            size_bytes: data.len() as u64,
            kind: metadata.kind,
            mime_type: metadata.mime_type.clone(),
        })
    }

    async fn retrieve(&self, reference: &ArtifactReference) -> StorytoonsResult<Vec<u8>> {
        let data = self
            .entries
            .read()
            .await
            .get(&reference.storage_path)
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
            })?;
        verify_hash(&data, reference)?;
        Ok(data)
    }

    async fn delete(&self, reference: &ArtifactReference) -> StorytoonsResult<()> {
        self.entries
            .write()
            .await
            .remove(&reference.storage_path)
            .map(|_| ())
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
                    .into()
            })
    }

    async fn exists(&self, reference: &ArtifactReference) -> StorytoonsResult<bool> {
        Ok(self
            .entries
            .read()
            .await
            .contains_key(&reference.storage_path))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
