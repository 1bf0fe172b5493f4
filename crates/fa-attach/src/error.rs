//! Attachment workflow errors
//!
//! Every variant is recoverable within one attach attempt; nothing here is
//! fatal to the process and no retries happen automatically.

use fa_backends::BackendError;
use thiserror::Error;

/// Attachment errors
#[derive(Debug, Error)]
pub enum AttachError {
    /// Listing or connecting to the source backend failed. Distinct from an
    /// empty listing, which is not an error.
    #[error("Backend {scheme} unavailable: {reason}")]
    BackendUnavailable { scheme: String, reason: String },

    /// The destination directory does not exist and could not be created
    #[error("Destination {destination} is not configured correctly: {reason}")]
    DestinationNotConfigured {
        destination: String,
        reason: String,
    },

    /// An upload validator rejected the file
    #[error("Validation failed ({rule}): {message}")]
    ValidationFailed {
        rule: &'static str,
        message: String,
    },

    /// A rename/copy/delete failed mid-policy
    #[error("Transfer failed during {stage}: {source}")]
    TransferIo {
        stage: &'static str,
        #[source]
        source: BackendError,
    },

    /// The submitted value is not part of the offered option set
    #[error("Unknown selection: {0}")]
    UnknownSelection(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type AttachResult<T> = Result<T, AttachError>;
