//! Request context and source-path resolution
//!
//! The original attach flow reached for process-wide services (current user,
//! token replacement) wherever it needed them. Here the caller hands in a
//! `RequestContext` and path resolution is a pure function of it.

use serde::{Deserialize, Serialize};

use crate::config::FieldAttachConfig;

/// A `scheme://path` pair addressing a file or directory on a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUri {
    pub scheme: String,
    pub path: String,
}

impl SourceUri {
    pub fn new(scheme: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            path: normalize(path.into()),
        }
    }

    /// Parse `scheme://path`. Returns `None` for blank input, a missing
    /// separator, or an empty scheme; a blank selection must never resolve
    /// to a transferable location.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let (scheme, path) = value.split_once("://")?;
        if scheme.is_empty() {
            return None;
        }
        Some(Self::new(scheme, path))
    }

    /// Append a path segment
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.trim_matches('/');
        if self.path.is_empty() {
            Self::new(self.scheme.clone(), segment)
        } else {
            Self::new(self.scheme.clone(), format!("{}/{}", self.path, segment))
        }
    }

    /// Final path segment
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Directory portion of the path ("" when the path has one segment)
    pub fn parent(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        }
    }

    /// Same directory, different final segment
    pub fn with_basename(&self, name: &str) -> Self {
        let parent = self.parent();
        if parent.is_empty() {
            Self::new(self.scheme.clone(), name)
        } else {
            Self::new(self.scheme.clone(), format!("{}/{}", parent, name))
        }
    }
}

impl std::fmt::Display for SourceUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path)
    }
}

fn normalize(path: String) -> String {
    path.trim_matches('/').to_string()
}

/// The user on whose behalf an attach request runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
}

impl UserRef {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Explicit per-request dependencies
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: UserRef,
}

impl RequestContext {
    pub fn new(user: UserRef) -> Self {
        Self { user }
    }

    /// Expand user-scoped placeholders in a path template. Unknown
    /// placeholders are left verbatim.
    pub fn expand_tokens(&self, template: &str) -> String {
        template
            .replace("[user:name]", &self.user.name)
            .replace("[user:uid]", &self.user.id.to_string())
    }
}

/// Resolve a field's attach directory: expand placeholders in the path
/// template and qualify it with the field's source scheme.
pub fn resolve_directory(field: &FieldAttachConfig, ctx: &RequestContext) -> SourceUri {
    SourceUri::new(field.scheme.clone(), ctx.expand_tokens(&field.path))
}
