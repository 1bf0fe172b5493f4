//! # fa-attach
//!
//! File attachment workflow for FileAttach RS.
//!
//! Attaches files already present on a configured storage backend to a
//! content record: list a backend directory as selectable options, then
//! move, copy or serve-in-place the chosen file into managed storage.
//!
//! ## Features
//!
//! - Option listing with case-insensitive ordering and a blank sentinel
//! - Filename sanitization and extension munging
//! - Upload validators, applied without size checks on the attach path
//! - Move / Copy / ServeInPlace transfer policy with original-name restore
//! - Managed file registry abstraction with an in-memory implementation
//!
//! ## Example
//!
//! ```rust,ignore
//! use fa_attach::{AttachmentWorkflow, AttachRecord, MemoryFileRegistry, OptionLister};
//! use fa_backends::BackendRegistry;
//! use fa_core::{resolve_directory, AppConfig, RequestContext, UserRef};
//! use std::sync::Arc;
//!
//! let config = AppConfig::from_env()?;
//! let backends = BackendRegistry::from_settings(&config.backends);
//! let registry = Arc::new(MemoryFileRegistry::new());
//!
//! let ctx = RequestContext::new(UserRef::new(1, "editor"));
//! let dir = resolve_directory(&field, &ctx);
//! let options = OptionLister::new(backends.clone()).list(&dir).await?;
//!
//! let workflow = AttachmentWorkflow::new(backends, registry);
//! let mut record = AttachRecord::new();
//! workflow.attach(&selection, &options, &mut record, &field).await?;
//! ```

pub mod error;
pub mod model;
pub mod options;
pub mod registry;
pub mod sanitize;
pub mod transfer;
pub mod validate;
pub mod workflow;

pub use error::{AttachError, AttachResult};
pub use model::{
    AttachOption, AttachOptionSet, AttachRecord, FileId, ManagedFile, TransferRequest,
    TransferResult, SELECT_FILE_LABEL,
};
pub use options::OptionLister;
pub use registry::{ManagedFileRegistry, MemoryFileRegistry};
pub use sanitize::clean_filename;
pub use transfer::FileTransferPolicy;
pub use validate::{
    validation_help, validators_for_field, without_size_checks, UploadValidator,
    DEFAULT_MAX_NAME_LENGTH,
};
pub use workflow::AttachmentWorkflow;
