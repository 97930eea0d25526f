//! Two-step deletion: a path is registered first, then confirmed or cancelled by token.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::FilesError;
use super::trash::TrashMover;

/// Pending deletions keyed by an opaque token.
///
/// Each token is consumed exactly once: on confirm (whatever the trash
/// outcome) or on cancel. Pending entries never expire; the capacity bound
/// keeps the map from growing without limit.
pub struct DeletionRegistry {
    pending: Mutex<HashMap<String, PathBuf>>,
    capacity: usize,
    trash: Box<dyn TrashMover>,
}

impl DeletionRegistry {
    pub fn new(capacity: usize, trash: Box<dyn TrashMover>) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            capacity,
            trash,
        }
    }

    /// Registers `path` for deletion and returns its token.
    ///
    /// The path must name an existing file or directory. Relative paths are
    /// made absolute against the process cwd before they are stored.
    pub async fn request(&self, path: &Path) -> Result<String, FilesError> {
        if path.as_os_str().is_empty() {
            return Err(FilesError::EmptyPath);
        }
        let path = std::path::absolute(path)?;
        if tokio::fs::symlink_metadata(&path).await.is_err() {
            return Err(FilesError::NotFound { path });
        }

        let mut pending = self.pending.lock().await;
        if pending.len() >= self.capacity {
            return Err(FilesError::RegistryFull {
                limit: self.capacity,
            });
        }

        let token = Uuid::new_v4().to_string();
        pending.insert(token.clone(), path.clone());
        debug!(token = %token, path = %path.display(), "Deletion requested");
        Ok(token)
    }

    /// Consumes `token` and moves its path to the trash.
    pub async fn confirm(&self, token: &str) -> Result<PathBuf, FilesError> {
        let path = self
            .pending
            .lock()
            .await
            .remove(token)
            .ok_or(FilesError::InvalidToken)?;

        info!(path = %path.display(), trash = self.trash.name(), "Deletion confirmed");
        self.trash.move_to_trash(&path).await?;
        Ok(path)
    }

    /// Consumes `token` without touching the file.
    pub async fn cancel(&self, token: &str) -> Result<PathBuf, FilesError> {
        let path = self
            .pending
            .lock()
            .await
            .remove(token)
            .ok_or(FilesError::InvalidToken)?;
        debug!(path = %path.display(), "Deletion cancelled");
        Ok(path)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex as StdMutex};
    use tempfile::TempDir;

    #[derive(Default, Clone)]
    struct RecordingTrash {
        moved: Arc<StdMutex<Vec<PathBuf>>>,
        fail: bool,
    }

    #[async_trait]
    impl TrashMover for RecordingTrash {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn move_to_trash(&self, path: &Path) -> Result<(), FilesError> {
            if self.fail {
                return Err(FilesError::trash(path, "refused"));
            }
            self.moved.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"x").unwrap();
        path
    }

    #[tokio::test]
    async fn test_confirm_consumes_token() {
        let dir = TempDir::new().unwrap();
        let file = touch(&dir, "a.mp4");
        let trash = RecordingTrash::default();
        let registry = DeletionRegistry::new(8, Box::new(trash.clone()));

        let token = registry.request(&file).await.unwrap();
        assert_eq!(registry.pending_count().await, 1);

        let moved = registry.confirm(&token).await.unwrap();
        assert_eq!(moved, file);
        assert_eq!(trash.moved.lock().unwrap().as_slice(), &[file]);

        assert!(matches!(
            registry.confirm(&token).await,
            Err(FilesError::InvalidToken)
        ));
        assert_eq!(registry.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_trash_still_consumes_token() {
        let dir = TempDir::new().unwrap();
        let file = touch(&dir, "a.mp4");
        let trash = RecordingTrash {
            fail: true,
            ..Default::default()
        };
        let registry = DeletionRegistry::new(8, Box::new(trash));

        let token = registry.request(&file).await.unwrap();
        assert!(matches!(
            registry.confirm(&token).await,
            Err(FilesError::Trash { .. })
        ));
        assert!(matches!(
            registry.cancel(&token).await,
            Err(FilesError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_cancel_leaves_file() {
        let dir = TempDir::new().unwrap();
        let file = touch(&dir, "a.mp4");
        let trash = RecordingTrash::default();
        let registry = DeletionRegistry::new(8, Box::new(trash.clone()));

        let token = registry.request(&file).await.unwrap();
        registry.cancel(&token).await.unwrap();

        assert!(file.exists());
        assert!(trash.moved.lock().unwrap().is_empty());
        assert!(registry.confirm(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_request_rejects_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        let registry = DeletionRegistry::new(8, Box::new(RecordingTrash::default()));

        assert!(matches!(
            registry.request(Path::new("")).await,
            Err(FilesError::EmptyPath)
        ));
        assert!(matches!(
            registry.request(&dir.path().join("missing")).await,
            Err(FilesError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let dir = TempDir::new().unwrap();
        let file = touch(&dir, "a.mp4");
        let registry = DeletionRegistry::new(2, Box::new(RecordingTrash::default()));

        let first = registry.request(&file).await.unwrap();
        registry.request(&file).await.unwrap();
        assert!(matches!(
            registry.request(&file).await,
            Err(FilesError::RegistryFull { limit: 2 })
        ));

        registry.cancel(&first).await.unwrap();
        assert!(registry.request(&file).await.is_ok());
    }

    #[tokio::test]
    async fn test_relative_path_is_stored_absolute() {
        let trash = RecordingTrash::default();
        let registry = DeletionRegistry::new(8, Box::new(trash.clone()));

        // Test binaries run from the package root.
        let token = registry.request(Path::new("Cargo.toml")).await.unwrap();
        let moved = registry.confirm(&token).await.unwrap();

        let expected = std::env::current_dir().unwrap().join("Cargo.toml");
        assert!(moved.is_absolute());
        assert_eq!(moved, expected);
        assert_eq!(trash.moved.lock().unwrap().as_slice(), &[expected]);
    }
}
