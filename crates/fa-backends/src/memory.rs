//! In-memory backend for tests and embedding

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::backend::{BackendEntry, BackendError, BackendResult, StorageBackend};

#[derive(Default)]
struct Inner {
    files: HashMap<String, Bytes>,
    dirs: HashSet<String>,
}

impl Inner {
    /// A directory exists when it was created explicitly, is the root, or
    /// is an ancestor of any stored file
    fn dir_exists(&self, path: &str) -> bool {
        if path.is_empty() || self.dirs.contains(path) {
            return true;
        }
        let prefix = format!("{}/", path);
        self.files.keys().any(|k| k.starts_with(&prefix))
    }
}

/// Backend keeping all content in process memory
pub struct MemoryBackend {
    scheme: String,
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            inner: RwLock::new(Inner::default()),
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn list(&self, path: &str, recursive: bool) -> BackendResult<Vec<BackendEntry>> {
        let inner = self.inner.read().await;

        if !inner.dir_exists(path) {
            return Err(BackendError::Unavailable(format!(
                "{}://{} does not exist",
                self.scheme, path
            )));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let entries = inner
            .files
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| recursive || !key[prefix.len()..].contains('/'))
            .map(|(key, data)| BackendEntry::new(key.clone(), data.len() as u64))
            .collect();

        Ok(entries)
    }

    async fn read(&self, path: &str) -> BackendResult<Bytes> {
        let inner = self.inner.read().await;
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, data: Bytes) -> BackendResult<()> {
        let mut inner = self.inner.write().await;
        inner.files.insert(path.to_string(), data);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        let mut inner = self.inner.write().await;
        let data = inner
            .files
            .remove(from)
            .ok_or_else(|| BackendError::NotFound(from.to_string()))?;
        inner.files.insert(to.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> BackendResult<()> {
        let mut inner = self.inner.write().await;
        inner.files.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> BackendResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.files.contains_key(path))
    }

    async fn ensure_dir(&self, path: &str, _mode: u32) -> BackendResult<()> {
        let mut inner = self.inner.write().await;
        inner.dirs.insert(path.to_string());
        Ok(())
    }
}
