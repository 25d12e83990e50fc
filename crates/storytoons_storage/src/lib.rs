//! Per-run artifact storage for StoryToons.
//!
//! Every pipeline run owns its artifacts. Stores key them by run id, so two
//! runs never write to the same slot, and record a SHA-256 hash so a reader
//! can tell when stored content has changed underneath it.
//!
//! # Example
//!
//! ```rust
//! use storytoons_storage::{ArtifactKind, ArtifactMetadata, ArtifactStore, MemoryStorage};
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = MemoryStorage::new();
//! let metadata = ArtifactMetadata::new(ArtifactKind::Image, "image/png", "png");
//!
//! let run_id = Uuid::new_v4();
//! let reference = storage.store(run_id, b"png bytes", &metadata).await?;
//! assert_eq!(storage.retrieve(&reference).await?, b"png bytes");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use storytoons_core::ArtifactLocation;
use storytoons_error::StorytoonsResult;
use uuid::Uuid;

mod filesystem;
mod memory;

pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;
pub use storytoons_error::{StorageError, StorageErrorKind};

/// Trait for pluggable artifact storage backends.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store an artifact for a run and return a reference to it.
    ///
    /// Storing the same kind twice for one run replaces the earlier content.
    async fn store(
        &self,
        run_id: Uuid,
        data: &[u8],
        metadata: &ArtifactMetadata,
    ) -> StorytoonsResult<ArtifactReference>;

    /// Retrieve artifact bytes, verifying the recorded content hash.
    async fn retrieve(&self, reference: &ArtifactReference) -> StorytoonsResult<Vec<u8>>;

    /// Delete an artifact.
    async fn delete(&self, reference: &ArtifactReference) -> StorytoonsResult<()>;

    /// Check whether an artifact exists.
    async fn exists(&self, reference: &ArtifactReference) -> StorytoonsResult<bool>;

    /// Backend name recorded in references (e.g., "filesystem").
    fn backend_name(&self) -> &'static str;
}

/// What kind of artifact is being stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactKind {
    /// Generated raster image
    Image,
    /// Synthesized narration audio
    Audio,
}

/// Metadata about an artifact being stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    /// Kind of artifact
    pub kind: ArtifactKind,
    /// MIME type (e.g., "image/png", "audio/mpeg")
    pub mime_type: String,
    /// File extension without the dot
    pub extension: String,
}

impl ArtifactMetadata {
    /// Create metadata for an artifact.
    pub fn new(
        kind: ArtifactKind,
        mime_type: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            mime_type: mime_type.into(),
            extension: extension.into(),
        }
    }

    /// Slot name for this artifact within its run (e.g., "image.png").
    pub fn slot_name(&self) -> String {
        format!("{}.{}", self.kind, self.extension)
    }
}

/// Reference to a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    /// Run that owns the artifact
    pub run_id: Uuid,
    /// SHA-256 hash of the content
    pub content_hash: String,
    /// Storage backend name
    pub storage_backend: String,
    /// Backend-specific path or key
    pub storage_path: String,
    /// Size of the artifact in bytes
    pub size_bytes: u64,
    /// Kind of artifact
    pub kind: ArtifactKind,
    /// MIME type
    pub mime_type: String,
}

impl ArtifactReference {
    /// Location summary attached to pipeline artifacts.
    pub fn location(&self) -> ArtifactLocation {
        ArtifactLocation {
            backend: self.storage_backend.clone(),
            path: self.storage_path.clone(),
            content_hash: self.content_hash.clone(),
        }
    }
}

/// Compute the SHA-256 hash of data as lowercase hex.
pub(crate) fn compute_hash(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Verify content hash matches the recorded hash.
pub(crate) fn verify_hash(data: &[u8], reference: &ArtifactReference) -> StorytoonsResult<()> {
    let actual = compute_hash(data);
    if actual != reference.content_hash {
        return Err(StorageError::new(StorageErrorKind::HashMismatch(format!(
            "{}: expected {}, got {}",
            reference.storage_path, reference.content_hash, actual
        )))
        .into());
    }
    Ok(())
}
