//! # fa-core
//!
//! Core types for FileAttach RS.
//!
//! This crate provides the building blocks shared by the backend and
//! workflow crates:
//! - Backend and field configuration (`BackendSettings`, `FieldAttachConfig`)
//! - Attach modes and backend descriptors
//! - Request context and source-path resolution (`RequestContext`, `SourceUri`)

pub mod config;
pub mod context;

pub use config::{
    AppConfig, AttachMode, BackendDescriptor, BackendDriver, BackendSettings, ConfigError,
    DropboxConfig, FieldAttachConfig, DEFAULT_ATTACH_PATH, DEFAULT_CHMOD_DIRECTORY,
};
pub use context::{resolve_directory, RequestContext, SourceUri, UserRef};
