//! Attach option listing
//!
//! Turns a backend directory into the sorted, labeled option list offered
//! to the user. Read-only; never mutates backend state.

use fa_backends::BackendRegistry;
use fa_core::SourceUri;
use tracing::{debug, instrument};

use crate::error::{AttachError, AttachResult};
use crate::model::AttachOptionSet;

/// Builds selectable option sets from backend directories
#[derive(Clone)]
pub struct OptionLister {
    backends: BackendRegistry,
}

impl OptionLister {
    pub fn new(backends: BackendRegistry) -> Self {
        Self { backends }
    }

    /// Recursively enumerate the files under `dir` as `(scheme://path,
    /// basename)` options. A missing or unreachable directory is
    /// `BackendUnavailable`; a reachable directory with no files yields an
    /// empty set — the UI presents the two differently.
    #[instrument(skip(self), fields(dir = %dir))]
    pub async fn list(&self, dir: &SourceUri) -> AttachResult<AttachOptionSet> {
        let backend =
            self.backends
                .get(&dir.scheme)
                .ok_or_else(|| AttachError::BackendUnavailable {
                    scheme: dir.scheme.clone(),
                    reason: "no backend registered for scheme".to_string(),
                })?;

        let entries = backend.list(&dir.path, true).await.map_err(|e| {
            AttachError::BackendUnavailable {
                scheme: dir.scheme.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!(count = entries.len(), "Attach options listed");

        Ok(AttachOptionSet::from_entries(entries.into_iter().map(
            |entry| {
                (
                    SourceUri::new(dir.scheme.clone(), entry.path).to_string(),
                    entry.basename,
                )
            },
        )))
    }
}
