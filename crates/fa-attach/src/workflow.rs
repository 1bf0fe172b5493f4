//! Attachment workflow
//!
//! The entry point a host UI layer calls on submission: looks up the
//! selection, drives the transfer policy, and records the resulting file id
//! on the owning record.

use std::sync::Arc;

use fa_backends::BackendRegistry;
use fa_core::{FieldAttachConfig, SourceUri};
use tracing::{debug, info, instrument};

use crate::error::{AttachError, AttachResult};
use crate::model::{AttachOptionSet, AttachRecord, FileId, TransferRequest};
use crate::registry::ManagedFileRegistry;
use crate::transfer::FileTransferPolicy;
use crate::validate::validators_for_field;

/// Orchestrates one attach submission
pub struct AttachmentWorkflow {
    policy: FileTransferPolicy,
}

impl AttachmentWorkflow {
    pub fn new(backends: BackendRegistry, registry: Arc<dyn ManagedFileRegistry>) -> Self {
        Self {
            policy: FileTransferPolicy::new(backends, registry),
        }
    }

    pub fn with_policy(policy: FileTransferPolicy) -> Self {
        Self { policy }
    }

    /// Attach the selected file to the record. A blank selection is a
    /// no-op; a successful attach appends the new file id to the record
    /// unless it is already present. On failure the record is untouched.
    #[instrument(skip(self, options, record, field), fields(selection = %selection))]
    pub async fn attach(
        &self,
        selection: &str,
        options: &AttachOptionSet,
        record: &mut AttachRecord,
        field: &FieldAttachConfig,
    ) -> AttachResult<Option<FileId>> {
        if selection.trim().is_empty() {
            debug!("Blank selection; nothing to attach");
            return Ok(None);
        }

        if !options.contains(selection) {
            return Err(AttachError::UnknownSelection(selection.to_string()));
        }

        let source = SourceUri::parse(selection)
            .ok_or_else(|| AttachError::UnknownSelection(selection.to_string()))?;

        let destination = SourceUri::parse(&field.destination).ok_or_else(|| {
            AttachError::DestinationNotConfigured {
                destination: field.destination.clone(),
                reason: "destination is missing or malformed".to_string(),
            }
        })?;

        let validators = validators_for_field(field);
        let request = TransferRequest::new(source, destination, field.attach_mode);
        let result = self.policy.execute(request, &validators).await?;

        if record.push_unique(result.file_id) {
            info!(file_id = result.file_id, "File id added to record");
        } else {
            debug!(file_id = result.file_id, "File id already on record");
        }

        Ok(Some(result.file_id))
    }
}
