//! Configuration types and loading
//!
//! Backend settings describe which storage backends exist and how they are
//! constructed; field settings describe how a single file field attaches
//! files from one of them. Both are read-only at request time.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default directory (within a backend) that holds attachable files.
pub const DEFAULT_ATTACH_PATH: &str = "attach";

/// Default mode bits applied when creating a destination directory.
pub const DEFAULT_CHMOD_DIRECTORY: u32 = 0o775;

/// How a selected file reaches the managed destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachMode {
    /// Relocate the file; the source copy is removed afterwards
    #[default]
    Move,
    /// Duplicate the file; the source is left untouched
    Copy,
    /// Register the file at its current location without moving bytes.
    /// Only meaningful when the source backend is also the field's
    /// storage destination.
    ServeInPlace,
}

impl AttachMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
            Self::ServeInPlace => "serve_in_place",
        }
    }
}

impl std::fmt::Display for AttachMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dropbox connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropboxConfig {
    /// OAuth2 access token
    pub access_token: String,
    /// Path prefix inside the Dropbox namespace
    pub root: String,
}

/// Constructor data for one storage backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendDriver {
    /// Local filesystem rooted at a directory
    Local { root: PathBuf },
    /// In-memory backend (tests, embedding)
    Memory,
    /// Dropbox remote
    Dropbox(DropboxConfig),
}

impl BackendDriver {
    pub fn driver_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Memory => "memory",
            Self::Dropbox(_) => "dropbox",
        }
    }

    /// Capitalized driver name, as shown in settings UIs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "Local",
            Self::Memory => "Memory",
            Self::Dropbox(_) => "Dropbox",
        }
    }
}

/// Configuration-time description of an available backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Scheme identifier, e.g. "local"
    pub scheme: String,
    /// Human-readable driver name, e.g. "Dropbox"
    pub driver: String,
}

/// Scheme -> driver map, loaded once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    schemes: BTreeMap<String, BackendDriver>,
}

impl BackendSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, scheme: impl Into<String>, driver: BackendDriver) -> Self {
        self.schemes.insert(scheme.into(), driver);
        self
    }

    pub fn get(&self, scheme: &str) -> Option<&BackendDriver> {
        self.schemes.get(scheme)
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BackendDriver)> {
        self.schemes.iter()
    }

    /// Describe every configured backend, in scheme order
    pub fn descriptors(&self) -> Vec<BackendDescriptor> {
        self.schemes
            .iter()
            .map(|(scheme, driver)| BackendDescriptor {
                scheme: scheme.clone(),
                driver: driver.display_name().to_string(),
            })
            .collect()
    }
}

/// Per-field attach settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAttachConfig {
    /// Scheme of the backend files are selected from
    pub scheme: String,
    /// Directory template within the backend; may contain user-scoped
    /// placeholders such as `[user:name]`
    pub path: String,
    /// Transfer mode for selected files
    pub attach_mode: AttachMode,
    /// Managed upload destination for this field, as `scheme://dir`
    pub destination: String,
    /// Allowed file extensions (lowercase, no dot); empty allows all
    pub allowed_extensions: Vec<String>,
    /// Maximum upload size in bytes; never enforced on the attach path,
    /// kept so hosts can present the full validator set elsewhere
    pub max_file_size: Option<u64>,
}

impl FieldAttachConfig {
    pub fn new(scheme: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            path: DEFAULT_ATTACH_PATH.to_string(),
            attach_mode: AttachMode::default(),
            destination: destination.into(),
            allowed_extensions: Vec::new(),
            max_file_size: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_mode(mut self, mode: AttachMode) -> Self {
        self.attach_mode = mode;
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.into().to_lowercase())
            .collect();
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }
}

/// Process-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Available storage backends
    pub backends: BackendSettings,
    /// Mode bits for created destination directories
    pub chmod_directory: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backends: BackendSettings::new().with_backend(
                "local",
                BackendDriver::Local {
                    root: PathBuf::from("/var/fileattach/files"),
                },
            ),
            chmod_directory: DEFAULT_CHMOD_DIRECTORY,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut backends = BackendSettings::new();

        if let Ok(root) = std::env::var("FILEATTACH_LOCAL_ROOT") {
            backends = backends.with_backend(
                "local",
                BackendDriver::Local {
                    root: PathBuf::from(root),
                },
            );
        }

        if let Ok(access_token) = std::env::var("FILEATTACH_DROPBOX_TOKEN") {
            backends = backends.with_backend(
                "dropbox",
                BackendDriver::Dropbox(DropboxConfig {
                    access_token,
                    root: std::env::var("FILEATTACH_DROPBOX_ROOT").unwrap_or_default(),
                }),
            );
        }

        let mut config = Self::default();
        if !backends.is_empty() {
            config.backends = backends;
        }

        if let Ok(mode) = std::env::var("FILEATTACH_CHMOD_DIRECTORY") {
            config.chmod_directory = u32::from_str_radix(mode.trim_start_matches("0o"), 8)
                .map_err(|e| ConfigError::InvalidValue {
                    key: "FILEATTACH_CHMOD_DIRECTORY".to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chmod_directory, 0o775);
        assert!(config.backends.get("local").is_some());
    }

    #[test]
    fn test_descriptors_ordered_by_scheme() {
        let settings = BackendSettings::new()
            .with_backend("dropbox", BackendDriver::Dropbox(DropboxConfig::default()))
            .with_backend("local", BackendDriver::Local { root: "/tmp".into() });

        let descriptors = settings.descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].scheme, "dropbox");
        assert_eq!(descriptors[0].driver, "Dropbox");
        assert_eq!(descriptors[1].scheme, "local");
        assert_eq!(descriptors[1].driver, "Local");
    }

    #[test]
    fn test_field_config_builder() {
        let field = FieldAttachConfig::new("local", "managed://attachments")
            .with_path("uploads/pending")
            .with_mode(AttachMode::Copy)
            .with_extensions(["PDF", "txt"]);

        assert_eq!(field.scheme, "local");
        assert_eq!(field.path, "uploads/pending");
        assert_eq!(field.attach_mode, AttachMode::Copy);
        assert_eq!(field.allowed_extensions, vec!["pdf", "txt"]);
        assert_eq!(field.max_file_size, None);
    }

    #[test]
    fn test_attach_mode_serde() {
        let json = serde_json::to_string(&AttachMode::ServeInPlace).unwrap();
        assert_eq!(json, "\"serve_in_place\"");
        let mode: AttachMode = serde_json::from_str("\"move\"").unwrap();
        assert_eq!(mode, AttachMode::Move);
    }
}
