//! File transfer policy
//!
//! Executes one `TransferRequest`: prepares the destination, sanitizes the
//! source name in place, runs the validators (size checks excluded),
//! relocates or registers the bytes according to the mode, restores the
//! source's original name where it survives, and registers the result.

use std::sync::Arc;

use bytes::Bytes;
use fa_backends::{BackendError, BackendRegistry, StorageBackend};
use fa_core::{AttachMode, SourceUri, DEFAULT_CHMOD_DIRECTORY};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{AttachError, AttachResult};
use crate::model::{ManagedFile, TransferRequest, TransferResult};
use crate::registry::ManagedFileRegistry;
use crate::sanitize::clean_filename;
use crate::validate::UploadValidator;

/// Executes transfer requests against the configured backends and registry
pub struct FileTransferPolicy {
    backends: BackendRegistry,
    registry: Arc<dyn ManagedFileRegistry>,
    chmod_directory: u32,
}

impl FileTransferPolicy {
    pub fn new(backends: BackendRegistry, registry: Arc<dyn ManagedFileRegistry>) -> Self {
        Self {
            backends,
            registry,
            chmod_directory: DEFAULT_CHMOD_DIRECTORY,
        }
    }

    pub fn with_chmod_directory(mut self, mode: u32) -> Self {
        self.chmod_directory = mode;
        self
    }

    /// Run one transfer. Either the file ends up fully registered or the
    /// registry is untouched; the source directory is left as it was except
    /// for a completed `Move`.
    #[instrument(skip(self, request, validators), fields(source = %request.source, mode = %request.mode))]
    pub async fn execute(
        &self,
        request: TransferRequest,
        validators: &[UploadValidator],
    ) -> AttachResult<TransferResult> {
        let TransferRequest {
            source,
            destination,
            mode,
        } = request;

        let source_backend = self.backend(&source.scheme)?;

        if !source_backend.exists(&source.path).await? {
            return Err(AttachError::Backend(BackendError::NotFound(
                source.to_string(),
            )));
        }

        // ServeInPlace registers the file exactly where it is; nothing on
        // the backend changes, so neither sanitize-rename nor destination
        // preparation applies.
        if mode == AttachMode::ServeInPlace {
            let data = source_backend
                .read(&source.path)
                .await
                .map_err(|e| AttachError::TransferIo {
                    stage: "read",
                    source: e,
                })?;
            check_validators(validators, source.basename(), data.len() as u64)?;

            let mut file = managed_file(source.clone(), &data);
            let file_id = self.registry.register(&mut file).await?;
            info!(file_id, uri = %file.uri, "File registered in place");
            return Ok(TransferResult { file_id, file });
        }

        let dest_backend = self.backend(&destination.scheme)?;
        dest_backend
            .ensure_dir(&destination.path, self.chmod_directory)
            .await
            .map_err(|e| AttachError::DestinationNotConfigured {
                destination: destination.to_string(),
                reason: e.to_string(),
            })?;

        // Rename the source to its cleaned name; remember the original for
        // the restore step.
        let cleaned = clean_filename(source.basename(), allowed_extensions(validators));
        let sanitized = if cleaned != source.basename() {
            let target = source.with_basename(&cleaned);
            source_backend
                .rename(&source.path, &target.path)
                .await
                .map_err(|e| AttachError::TransferIo {
                    stage: "sanitize",
                    source: e,
                })?;
            target
        } else {
            source.clone()
        };

        let outcome = self
            .relocate(&source_backend, &dest_backend, &sanitized, &destination, mode, validators)
            .await;

        // The restore runs on success and failure alike: except for a
        // completed Move, the source directory must look untouched.
        self.restore_original_name(source_backend.as_ref(), &sanitized, &source)
            .await;

        let (final_uri, data) = outcome?;
        let mut file = managed_file(final_uri, &data);
        let file_id = self.registry.register(&mut file).await?;
        info!(file_id, uri = %file.uri, "File attached");

        Ok(TransferResult { file_id, file })
    }

    async fn relocate(
        &self,
        source_backend: &Arc<dyn StorageBackend>,
        dest_backend: &Arc<dyn StorageBackend>,
        sanitized: &SourceUri,
        destination: &SourceUri,
        mode: AttachMode,
        validators: &[UploadValidator],
    ) -> AttachResult<(SourceUri, Bytes)> {
        let data = source_backend
            .read(&sanitized.path)
            .await
            .map_err(|e| AttachError::TransferIo {
                stage: "read",
                source: e,
            })?;

        check_validators(validators, sanitized.basename(), data.len() as u64)?;

        let target = self
            .unique_destination(dest_backend, destination, sanitized.basename())
            .await?;

        dest_backend
            .write(&target.path, data.clone())
            .await
            .map_err(|e| AttachError::TransferIo {
                stage: "write",
                source: e,
            })?;

        if mode == AttachMode::Move {
            // Best effort: a failed deletion leaves an orphan copy behind
            // but the transfer itself stands.
            if let Err(e) = source_backend.delete(&sanitized.path).await {
                warn!(source = %sanitized, error = %e, "Source deletion failed after move; orphan copy left behind");
            }
        }

        Ok((target, data))
    }

    /// Rename the sanitized source back to its original basename — only if
    /// it still exists and nothing else has taken the original path in the
    /// meantime. Best effort; failures are logged, never raised.
    async fn restore_original_name(
        &self,
        backend: &dyn StorageBackend,
        sanitized: &SourceUri,
        original: &SourceUri,
    ) {
        if sanitized == original {
            return;
        }
        if !matches!(backend.exists(&sanitized.path).await, Ok(true)) {
            return;
        }
        match backend.exists(&original.path).await {
            Ok(false) => {
                if let Err(e) = backend.rename(&sanitized.path, &original.path).await {
                    warn!(from = %sanitized, to = %original, error = %e, "Failed to restore original filename");
                }
            }
            Ok(true) => {
                warn!(path = %original, "Restore skipped; another file now occupies the original path");
            }
            Err(e) => {
                warn!(path = %original, error = %e, "Restore skipped; could not check original path");
            }
        }
    }

    /// Pick a destination path that does not collide with an existing file
    async fn unique_destination(
        &self,
        backend: &Arc<dyn StorageBackend>,
        dir: &SourceUri,
        basename: &str,
    ) -> AttachResult<SourceUri> {
        let candidate = dir.join(basename);
        let occupied =
            backend
                .exists(&candidate.path)
                .await
                .map_err(|e| AttachError::TransferIo {
                    stage: "destination",
                    source: e,
                })?;
        if !occupied {
            return Ok(candidate);
        }

        let disk_name = match basename.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}_{}.{ext}", Uuid::new_v4().simple()),
            None => format!("{basename}_{}", Uuid::new_v4().simple()),
        };
        Ok(dir.join(&disk_name))
    }

    fn backend(&self, scheme: &str) -> AttachResult<Arc<dyn StorageBackend>> {
        self.backends
            .get(scheme)
            .ok_or_else(|| AttachError::BackendUnavailable {
                scheme: scheme.to_string(),
                reason: "no backend registered for scheme".to_string(),
            })
    }
}

/// Apply every validator except size checks
fn check_validators(
    validators: &[UploadValidator],
    filename: &str,
    size: u64,
) -> AttachResult<()> {
    for validator in validators.iter().filter(|v| !v.is_size_check()) {
        validator.check(filename, size)?;
    }
    Ok(())
}

/// Extension allow-list carried by the validator set, if any
fn allowed_extensions(validators: &[UploadValidator]) -> &[String] {
    validators
        .iter()
        .find_map(|v| match v {
            UploadValidator::Extensions(exts) => Some(exts.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
}

fn managed_file(uri: SourceUri, data: &Bytes) -> ManagedFile {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hex::encode(hasher.finalize());

    let filename = uri.basename().to_string();
    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    ManagedFile::new(filename, uri, data.len() as u64, content_type, digest)
}
