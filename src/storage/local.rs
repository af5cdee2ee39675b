use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::BlobStore;
use crate::error::AppError;

/// URL prefix local files are served under (see `main.rs`).
pub const PUBLIC_PREFIX: &str = "/files";

/// Stores objects on the local filesystem and serves them through
/// `actix-files`.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, object_path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(object_path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::Storage(format!(
                "Refusing object path outside the store: {object_path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalDiskStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<String, AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {path}: {e}")))?;

        Ok(format!("{PUBLIC_PREFIX}/{path}"))
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let path = url
            .strip_prefix(PUBLIC_PREFIX)
            .map(|p| p.trim_start_matches('/'))
            .ok_or_else(|| AppError::Storage(format!("Not a local file URL: {url}")))?;

        match tokio::fs::remove_file(self.resolve(path)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete {path}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_delete_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());

        let url = store
            .upload("assignments/1-brief.pdf", b"brief".to_vec(), None)
            .await
            .unwrap();
        assert_eq!(url, "/files/assignments/1-brief.pdf");
        assert!(dir.path().join("assignments/1-brief.pdf").exists());

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join("assignments/1-brief.pdf").exists());

        // Releasing an already-missing object is not an error.
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn traversal_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());

        let result = store.upload("../escape.txt", b"x".to_vec(), None).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
