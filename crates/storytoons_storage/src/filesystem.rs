//! Filesystem-based artifact storage.
//!
//! Each run gets its own directory, so concurrent or consecutive runs never
//! overwrite one another's artifacts.

use crate::{
    ArtifactMetadata, ArtifactReference, ArtifactStore, compute_hash, verify_hash,
};
use std::path::{Path, PathBuf};
use storytoons_error::{StorageError, StorageErrorKind, StorytoonsResult};
use uuid::Uuid;

/// Filesystem storage backend.
///
/// Layout: `{base_path}/runs/{run_id}/{kind}.{ext}`
///
/// ```text
/// ./storytoons-output/
/// └── runs/
///     └── 0b6f.../
///         ├── image.png
///         └── audio.mp3
/// ```
///
/// Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StorytoonsResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory holding one run's artifacts.
    pub fn run_dir(&self, run_id: Uuid) -> PathBuf {
        self.base_path.join("runs").join(run_id.to_string())
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileSystemStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(run_id = %run_id, size = data.len(), kind = %metadata.kind))]
    async fn store(
        &self,
        run_id: Uuid,
        data: &[u8],
        metadata: &ArtifactMetadata,
    ) -> StorytoonsResult<ArtifactReference> {
        let hash = compute_hash(data);
        let dir = self.run_dir(run_id);
        let path = dir.join(metadata.slot_name());

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(
            hash = %hash,
            path = %path.display(),
            size = data.len(),
            "Stored artifact"
        );

        Ok(ArtifactReference {
            run_id,
            content_hash: hash,
            storage_backend: self.backend_name().to_string(),
            storage_path: path.to_string_lossy().to_string(),
            size_bytes: data.len() as u64,
            kind: metadata.kind,
            mime_type: metadata.mime_type.clone(),
        })
    }

    #[tracing::instrument(skip(self, reference), fields(path = %reference.storage_path))]
    async fn retrieve(&self, reference: &ArtifactReference) -> StorytoonsResult<Vec<u8>> {
        let path = Path::new(&reference.storage_path);

        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        verify_hash(&data, reference)?;

        tracing::debug!(size = data.len(), "Retrieved artifact");
        Ok(data)
    }

    #[tracing::instrument(skip(self, reference), fields(path = %reference.storage_path))]
    async fn delete(&self, reference: &ArtifactReference) -> StorytoonsResult<()> {
        let path = Path::new(&reference.storage_path);

        tokio::fs::remove_file(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.storage_path.clone()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "delete {}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::info!("Deleted artifact");
        Ok(())
    }

    async fn exists(&self, reference: &ArtifactReference) -> StorytoonsResult<bool> {
        let path = Path::new(&reference.storage_path);
        let present = tokio::fs::try_exists(path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(present)
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
