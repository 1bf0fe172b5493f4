//! Dropbox backend
//!
//! Configuration and addressing are wired; content operations need an HTTP
//! transport and report `Unsupported` until one is added.

use async_trait::async_trait;
use bytes::Bytes;
use fa_core::DropboxConfig;
use tracing::info;

use crate::backend::{BackendEntry, BackendError, BackendResult, StorageBackend};

const CONTENT_ENDPOINT: &str = "https://content.dropboxapi.com/2/files/download";

/// Dropbox remote backend
pub struct DropboxBackend {
    scheme: String,
    config: DropboxConfig,
}

impl DropboxBackend {
    pub fn new(scheme: impl Into<String>, config: DropboxConfig) -> Self {
        let scheme = scheme.into();
        info!(scheme = %scheme, root = %config.root, "Dropbox backend initialized");
        Self { scheme, config }
    }

    /// Absolute Dropbox path for a backend-relative path
    pub fn remote_path(&self, path: &str) -> String {
        if self.config.root.is_empty() {
            format!("/{}", path)
        } else {
            format!("/{}/{}", self.config.root.trim_matches('/'), path)
        }
    }

    /// Content-download URL for a backend-relative path
    pub fn content_url(&self, path: &str) -> String {
        format!("{}?path={}", CONTENT_ENDPOINT, self.remote_path(path))
    }

    fn unsupported(operation: &'static str) -> BackendError {
        BackendError::Unsupported {
            driver: "dropbox",
            operation,
        }
    }
}

#[async_trait]
impl StorageBackend for DropboxBackend {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn list(&self, _path: &str, _recursive: bool) -> BackendResult<Vec<BackendEntry>> {
        Err(Self::unsupported("list"))
    }

    async fn read(&self, _path: &str) -> BackendResult<Bytes> {
        Err(Self::unsupported("read"))
    }

    async fn write(&self, _path: &str, _data: Bytes) -> BackendResult<()> {
        Err(Self::unsupported("write"))
    }

    async fn rename(&self, _from: &str, _to: &str) -> BackendResult<()> {
        Err(Self::unsupported("rename"))
    }

    async fn delete(&self, _path: &str) -> BackendResult<()> {
        Err(Self::unsupported("delete"))
    }

    async fn exists(&self, _path: &str) -> BackendResult<bool> {
        Err(Self::unsupported("exists"))
    }

    async fn ensure_dir(&self, _path: &str, _mode: u32) -> BackendResult<()> {
        Err(Self::unsupported("ensure_dir"))
    }
}
