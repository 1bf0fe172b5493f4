//! Managed file registry
//!
//! The host CMS's file-entity store, seen through a minimal trait. The
//! in-memory implementation backs tests and standalone embedding.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AttachResult;
use crate::model::{FileId, ManagedFile};

/// Managed file store
#[async_trait]
pub trait ManagedFileRegistry: Send + Sync {
    /// Persist a file record, assigning its id
    async fn register(&self, file: &mut ManagedFile) -> AttachResult<FileId>;

    /// Fetch a file record by id
    async fn get(&self, id: FileId) -> AttachResult<Option<ManagedFile>>;

    /// Remove a file record
    async fn delete(&self, id: FileId) -> AttachResult<()>;
}

/// In-memory registry
pub struct MemoryFileRegistry {
    files: RwLock<Vec<ManagedFile>>,
    next_id: AtomicI64,
}

impl Default for MemoryFileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileRegistry {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of registered files
    pub async fn count(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl ManagedFileRegistry for MemoryFileRegistry {
    async fn register(&self, file: &mut ManagedFile) -> AttachResult<FileId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        file.id = Some(id);

        let mut files = self.files.write().await;
        files.push(file.clone());

        Ok(id)
    }

    async fn get(&self, id: FileId) -> AttachResult<Option<ManagedFile>> {
        let files = self.files.read().await;
        Ok(files.iter().find(|f| f.id == Some(id)).cloned())
    }

    async fn delete(&self, id: FileId) -> AttachResult<()> {
        let mut files = self.files.write().await;
        files.retain(|f| f.id != Some(id));
        Ok(())
    }
}
