//! Storage backend capability
//!
//! A small fixed operation set over heterogeneous storage, addressed by a
//! scheme identifier. Paths are always relative to the backend's own root;
//! a leading slash or a `..` component is rejected by implementations.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Operation {operation} not supported by {driver} backend")]
    Unsupported {
        driver: &'static str,
        operation: &'static str,
    },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// One file found by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEntry {
    /// Path relative to the backend root
    pub path: String,
    /// Final path segment
    pub basename: String,
    /// Size in bytes
    pub size: u64,
}

impl BackendEntry {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let basename = path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            path,
            basename,
            size,
        }
    }
}

/// Unified interface for storage backends
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Scheme identifier this backend is registered under
    fn scheme(&self) -> &str;

    /// Enumerate files under a directory. Directories are descended into
    /// when `recursive` is set but never returned themselves. A missing or
    /// unreachable directory is an error, distinct from an empty listing.
    async fn list(&self, path: &str, recursive: bool) -> BackendResult<Vec<BackendEntry>>;

    /// Read a file's content
    async fn read(&self, path: &str) -> BackendResult<Bytes>;

    /// Write a file, creating parent directories as needed
    async fn write(&self, path: &str, data: Bytes) -> BackendResult<()>;

    /// Rename a file within the backend
    async fn rename(&self, from: &str, to: &str) -> BackendResult<()>;

    /// Delete a file
    async fn delete(&self, path: &str) -> BackendResult<()>;

    /// Check whether a file exists
    async fn exists(&self, path: &str) -> BackendResult<bool>;

    /// Ensure a directory exists with the given mode bits, creating it
    /// if necessary
    async fn ensure_dir(&self, path: &str, mode: u32) -> BackendResult<()>;
}
