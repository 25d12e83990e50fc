//! Where a persisted artifact lives.

use serde::{Deserialize, Serialize};

/// Storage location of a persisted artifact.
///
/// Filled in by the orchestrator after the artifact store accepts the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactLocation {
    /// Storage backend name (e.g., "filesystem", "memory")
    pub backend: String,
    /// Backend-specific path or key
    pub path: String,
    /// SHA-256 hash of the stored content
    pub content_hash: String,
}
