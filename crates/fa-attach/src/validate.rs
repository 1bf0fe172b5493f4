//! Upload validators
//!
//! The same validator set a host applies to browser uploads, minus the
//! maximum-size check: the attach path exists specifically to let trusted
//! server-resident files past upload size limits.

use fa_core::FieldAttachConfig;

use crate::error::{AttachError, AttachResult};

/// Maximum filename length applied by default
pub const DEFAULT_MAX_NAME_LENGTH: usize = 240;

/// A single upload rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadValidator {
    /// Allowed file extensions (lowercase, no dot); empty allows all
    Extensions(Vec<String>),
    /// Maximum file size in bytes
    MaxSize(u64),
    /// Maximum filename length in characters
    NameLength(usize),
}

impl UploadValidator {
    /// Stable rule identifier carried in `ValidationFailed`
    pub fn rule(&self) -> &'static str {
        match self {
            Self::Extensions(_) => "extensions",
            Self::MaxSize(_) => "max_size",
            Self::NameLength(_) => "name_length",
        }
    }

    pub fn is_size_check(&self) -> bool {
        matches!(self, Self::MaxSize(_))
    }

    /// Human-readable description, suitable for form help text
    pub fn describe(&self) -> String {
        match self {
            Self::Extensions(exts) if exts.is_empty() => "All file types are allowed.".to_string(),
            Self::Extensions(exts) => format!("Allowed file types: {}.", exts.join(", ")),
            Self::MaxSize(max) => format!("Maximum file size: {} bytes.", max),
            Self::NameLength(max) => {
                format!("File names must be no longer than {} characters.", max)
            }
        }
    }

    /// Apply the rule to a candidate file
    pub fn check(&self, filename: &str, size: u64) -> AttachResult<()> {
        match self {
            Self::Extensions(exts) => {
                if exts.is_empty() {
                    return Ok(());
                }
                let extension = filename
                    .contains('.')
                    .then(|| filename.rsplit('.').next())
                    .flatten()
                    .unwrap_or("");
                if exts.iter().any(|e| e.eq_ignore_ascii_case(extension)) {
                    Ok(())
                } else {
                    Err(AttachError::ValidationFailed {
                        rule: self.rule(),
                        message: format!(
                            "Only files with the following extensions are allowed: {}.",
                            exts.join(", ")
                        ),
                    })
                }
            }
            Self::MaxSize(max) => {
                if size <= *max {
                    Ok(())
                } else {
                    Err(AttachError::ValidationFailed {
                        rule: self.rule(),
                        message: format!(
                            "The file is {} bytes, exceeding the maximum size of {} bytes.",
                            size, max
                        ),
                    })
                }
            }
            Self::NameLength(max) => {
                if filename.chars().count() <= *max {
                    Ok(())
                } else {
                    Err(AttachError::ValidationFailed {
                        rule: self.rule(),
                        message: format!(
                            "File names must be no longer than {} characters.",
                            max
                        ),
                    })
                }
            }
        }
    }
}

/// The validator set configured for a field
pub fn validators_for_field(field: &FieldAttachConfig) -> Vec<UploadValidator> {
    let mut validators = vec![
        UploadValidator::Extensions(field.allowed_extensions.clone()),
        UploadValidator::NameLength(DEFAULT_MAX_NAME_LENGTH),
    ];
    if let Some(max) = field.max_file_size {
        validators.push(UploadValidator::MaxSize(max));
    }
    validators
}

/// Drop every size check; the rest of the set applies unchanged
pub fn without_size_checks(validators: Vec<UploadValidator>) -> Vec<UploadValidator> {
    validators.into_iter().filter(|v| !v.is_size_check()).collect()
}

/// One help line per rule, for display beneath the select element
pub fn validation_help(validators: &[UploadValidator]) -> String {
    validators
        .iter()
        .map(UploadValidator::describe)
        .collect::<Vec<_>>()
        .join(" ")
}
