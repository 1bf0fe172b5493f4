//! Local filesystem backend

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

use crate::backend::{BackendEntry, BackendError, BackendResult, StorageBackend};

/// Storage backend rooted at a local directory
pub struct LocalBackend {
    scheme: String,
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(scheme: impl Into<String>, root: impl AsRef<Path>) -> Self {
        Self {
            scheme: scheme.into(),
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve a backend path to a full filesystem path
    fn resolve_path(&self, path: &str) -> BackendResult<PathBuf> {
        // Prevent directory traversal
        if path.split('/').any(|c| c == "..") || path.starts_with('/') || path.starts_with('\\') {
            return Err(BackendError::InvalidPath(path.to_string()));
        }

        Ok(self.root.join(path))
    }

    async fn ensure_parent(&self, path: &Path) -> BackendResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn list(&self, path: &str, recursive: bool) -> BackendResult<Vec<BackendEntry>> {
        let dir = self.resolve_path(path)?;

        if !fs::try_exists(&dir).await? {
            return Err(BackendError::Unavailable(format!(
                "{}://{} does not exist",
                self.scheme, path
            )));
        }
        if !fs::metadata(&dir).await?.is_dir() {
            return Err(BackendError::InvalidPath(path.to_string()));
        }

        let root = self.root.clone();
        let prefix = path.to_string();
        let entries = tokio::task::spawn_blocking(move || {
            let max_depth = if recursive { usize::MAX } else { 1 };
            let mut entries = Vec::new();
            for item in WalkDir::new(&dir).min_depth(1).max_depth(max_depth) {
                let item = item.map_err(|e| {
                    BackendError::Unavailable(format!("listing {}: {}", prefix, e))
                })?;
                if !item.file_type().is_file() {
                    continue;
                }
                let size = item.metadata().map(|m| m.len()).unwrap_or(0);
                let relative = item
                    .path()
                    .strip_prefix(&root)
                    .map_err(|_| BackendError::InvalidPath(item.path().display().to_string()))?;
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                entries.push(BackendEntry::new(relative, size));
            }
            Ok::<_, BackendError>(entries)
        })
        .await
        .map_err(|e| BackendError::Unavailable(format!("listing task failed: {e}")))??;

        debug!(scheme = %self.scheme, path = %path, count = entries.len(), "Directory listed");

        Ok(entries)
    }

    async fn read(&self, path: &str) -> BackendResult<Bytes> {
        let full = self.resolve_path(path)?;

        if !fs::try_exists(&full).await? {
            return Err(BackendError::NotFound(path.to_string()));
        }

        Ok(Bytes::from(fs::read(&full).await?))
    }

    async fn write(&self, path: &str, data: Bytes) -> BackendResult<()> {
        let full = self.resolve_path(path)?;
        self.ensure_parent(&full).await?;

        fs::write(&full, &data).await?;
        debug!(scheme = %self.scheme, path = %path, size = data.len(), "File written");

        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        let from_path = self.resolve_path(from)?;
        let to_path = self.resolve_path(to)?;

        if !fs::try_exists(&from_path).await? {
            return Err(BackendError::NotFound(from.to_string()));
        }

        self.ensure_parent(&to_path).await?;
        fs::rename(&from_path, &to_path).await?;
        debug!(scheme = %self.scheme, from = %from, to = %to, "File renamed");

        Ok(())
    }

    async fn delete(&self, path: &str) -> BackendResult<()> {
        let full = self.resolve_path(path)?;

        if fs::try_exists(&full).await? {
            fs::remove_file(&full).await?;
            debug!(scheme = %self.scheme, path = %path, "File deleted");
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> BackendResult<bool> {
        let full = self.resolve_path(path)?;
        Ok(fs::try_exists(&full).await?)
    }

    async fn ensure_dir(&self, path: &str, mode: u32) -> BackendResult<()> {
        let full = self.resolve_path(path)?;
        fs::create_dir_all(&full).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full, std::fs::Permissions::from_mode(mode)).await?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("local", dir.path());
        (dir, backend)
    }

    #[tokio::test]
    async fn test_write_read_round_trip() {
        let (_dir, backend) = backend();

        backend
            .write("uploads/notes.txt", Bytes::from("hello"))
            .await
            .unwrap();

        let data = backend.read("uploads/notes.txt").await.unwrap();
        assert_eq!(data, Bytes::from("hello"));
    }

    #[tokio::test]
    async fn test_list_recursive_files_only() {
        let (_dir, backend) = backend();

        backend.write("a/one.txt", Bytes::from("1")).await.unwrap();
        backend
            .write("a/nested/two.txt", Bytes::from("22"))
            .await
            .unwrap();

        let entries = backend.list("a", true).await.unwrap();
        let mut paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["a/nested/two.txt", "a/one.txt"]);

        let shallow = backend.list("a", false).await.unwrap();
        assert_eq!(shallow.len(), 1);
        assert_eq!(shallow[0].basename, "one.txt");
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_unavailable() {
        let (_dir, backend) = backend();

        let result = backend.list("nowhere", true).await;
        assert!(matches!(result, Err(BackendError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, backend) = backend();

        let result = backend.read("../../../etc/passwd").await;
        assert!(matches!(result, Err(BackendError::InvalidPath(_))));

        let result = backend.read("/etc/passwd").await;
        assert!(matches!(result, Err(BackendError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let (_dir, backend) = backend();

        backend.write("in/a.txt", Bytes::from("x")).await.unwrap();
        backend.rename("in/a.txt", "in/b.txt").await.unwrap();

        assert!(!backend.exists("in/a.txt").await.unwrap());
        assert!(backend.exists("in/b.txt").await.unwrap());

        backend.delete("in/b.txt").await.unwrap();
        assert!(!backend.exists("in/b.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_dir() {
        let (dir, backend) = backend();

        backend.ensure_dir("managed/attachments", 0o775).await.unwrap();
        assert!(dir.path().join("managed/attachments").is_dir());
    }
}
