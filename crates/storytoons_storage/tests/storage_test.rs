//! Tests for artifact storage backends.

use storytoons_error::StorytoonsErrorKind;
use storytoons_storage::{
    ArtifactKind, ArtifactMetadata, ArtifactStore, FileSystemStorage, MemoryStorage,
    StorageErrorKind,
};
use tempfile::TempDir;
use uuid::Uuid;

fn image_metadata() -> ArtifactMetadata {
    ArtifactMetadata::new(ArtifactKind::Image, "image/png", "png")
}

fn audio_metadata() -> ArtifactMetadata {
    ArtifactMetadata::new(ArtifactKind::Audio, "audio/mpeg", "mp3")
}

#[tokio::test]
async fn test_filesystem_store_and_retrieve() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
    let run_id = Uuid::new_v4();

    let data = b"fake png bytes";
    let reference = storage.store(run_id, data, &image_metadata()).await.unwrap();

    assert_eq!(reference.storage_backend, "filesystem");
    assert_eq!(reference.kind, ArtifactKind::Image);
    assert_eq!(reference.run_id, run_id);
    assert_eq!(reference.size_bytes, data.len() as u64);
    assert!(reference.storage_path.ends_with("image.png"));
    assert!(
        std::path::Path::new(&reference.storage_path).starts_with(storage.run_dir(run_id))
    );

    let retrieved = storage.retrieve(&reference).await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_filesystem_runs_do_not_share_slots() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let first = storage
        .store(Uuid::new_v4(), b"first run", &image_metadata())
        .await
        .unwrap();
    let second = storage
        .store(Uuid::new_v4(), b"second run", &image_metadata())
        .await
        .unwrap();

    assert_ne!(first.storage_path, second.storage_path);
    assert_eq!(storage.retrieve(&first).await.unwrap(), b"first run");
    assert_eq!(storage.retrieve(&second).await.unwrap(), b"second run");
}

#[tokio::test]
async fn test_filesystem_image_and_audio_slots_per_run() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
    let run_id = Uuid::new_v4();

    let image = storage.store(run_id, b"img", &image_metadata()).await.unwrap();
    let audio = storage.store(run_id, b"aud", &audio_metadata()).await.unwrap();

    assert!(image.storage_path.ends_with("image.png"));
    assert!(audio.storage_path.ends_with("audio.mp3"));
    assert!(storage.exists(&image).await.unwrap());
    assert!(storage.exists(&audio).await.unwrap());
}

#[tokio::test]
async fn test_filesystem_detects_tampering() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let reference = storage
        .store(Uuid::new_v4(), b"original", &audio_metadata())
        .await
        .unwrap();
    tokio::fs::write(&reference.storage_path, b"tampered")
        .await
        .unwrap();

    let err = storage.retrieve(&reference).await.unwrap_err();
    match err.kind() {
        StorytoonsErrorKind::Storage(e) => {
            assert!(matches!(e.kind, StorageErrorKind::HashMismatch(_)))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_filesystem_delete() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let reference = storage
        .store(Uuid::new_v4(), b"bytes", &image_metadata())
        .await
        .unwrap();
    storage.delete(&reference).await.unwrap();

    assert!(!storage.exists(&reference).await.unwrap());
    assert!(storage.retrieve(&reference).await.is_err());
    assert!(storage.delete(&reference).await.is_err());
}

#[tokio::test]
async fn test_filesystem_exists_reports_io_errors() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let mut reference = storage
        .store(Uuid::new_v4(), b"bytes", &image_metadata())
        .await
        .unwrap();
    // A path below a regular file cannot be stat'ed (ENOTDIR), which is not "absent"
    reference.storage_path = format!("{}/child.png", reference.storage_path);

    let err = storage.exists(&reference).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        StorytoonsErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::FileRead(_))
    ));
}

#[tokio::test]
async fn test_memory_store_overwrites_within_run() {
    let storage = MemoryStorage::new();
    let run_id = Uuid::new_v4();

    storage.store(run_id, b"v1", &image_metadata()).await.unwrap();
    let reference = storage.store(run_id, b"v2", &image_metadata()).await.unwrap();

    assert_eq!(storage.len().await, 1);
    assert_eq!(storage.retrieve(&reference).await.unwrap(), b"v2");
    assert_eq!(reference.storage_backend, "memory");
}

#[tokio::test]
async fn test_memory_delete_missing_is_not_found() {
    let storage = MemoryStorage::new();
    let reference = storage
        .store(Uuid::new_v4(), b"x", &audio_metadata())
        .await
        .unwrap();
    storage.delete(&reference).await.unwrap();
    assert!(storage.is_empty().await);

    let err = storage.delete(&reference).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        StorytoonsErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_))
    ));
}
