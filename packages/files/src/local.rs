// ABOUTME: Local-disk attachment store
// ABOUTME: Writes uploads under a configured directory with unique file names

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::{sanitize_file_name, FileError, FileStore, StorageKind, StoredFile};

pub struct LocalFileStore {
    base_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile, FileError> {
        fs::create_dir_all(&self.base_dir).await?;

        let file_name = sanitize_file_name(file_name);
        let unique_name = format!("{}-{}", planea_core::generate_id(), file_name);
        let path = self.base_dir.join(&unique_name);

        fs::write(&path, bytes).await?;
        debug!("Stored attachment at {}", path.display());

        Ok(StoredFile {
            url: path.display().to_string(),
            file_name,
            external_id: None,
            kind: StorageKind::Local,
        })
    }

    async fn delete(&self, stored: &StoredFile) -> Result<(), FileError> {
        fs::remove_file(&stored.url).await?;
        debug!("Deleted attachment {}", stored.url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().to_path_buf());

        let stored = store.save("plan.pdf", b"contents").await.unwrap();
        assert_eq!(stored.file_name, "plan.pdf");
        assert_eq!(stored.kind, StorageKind::Local);
        assert!(stored.external_id.is_none());

        let on_disk = fs::read(&stored.url).await.unwrap();
        assert_eq!(on_disk, b"contents");

        store.delete(&stored).await.unwrap();
        assert!(fs::metadata(&stored.url).await.is_err());
    }

    #[tokio::test]
    async fn test_saved_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().to_path_buf());

        let first = store.save("plan.pdf", b"a").await.unwrap();
        let second = store.save("plan.pdf", b"b").await.unwrap();
        assert_ne!(first.url, second.url);
    }
}
