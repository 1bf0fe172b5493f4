//! Scheme registry
//!
//! Maps scheme identifiers to constructed backends. Built once from
//! `BackendSettings` at startup and shared read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use fa_core::{BackendDriver, BackendSettings};

use crate::backend::StorageBackend;
use crate::dropbox::DropboxBackend;
use crate::local::LocalBackend;
use crate::memory::MemoryBackend;

/// Registry of available storage backends, keyed by scheme
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn StorageBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct every backend described by the settings
    pub fn from_settings(settings: &BackendSettings) -> Self {
        let mut registry = Self::new();
        for (scheme, driver) in settings.iter() {
            let backend: Arc<dyn StorageBackend> = match driver {
                BackendDriver::Local { root } => Arc::new(LocalBackend::new(scheme, root)),
                BackendDriver::Memory => Arc::new(MemoryBackend::new(scheme)),
                BackendDriver::Dropbox(config) => {
                    Arc::new(DropboxBackend::new(scheme, config.clone()))
                }
            };
            registry.register(backend);
        }
        registry
    }

    /// Add a backend under its own scheme
    pub fn register(&mut self, backend: Arc<dyn StorageBackend>) {
        self.backends.insert(backend.scheme().to_string(), backend);
    }

    /// Look up the backend for a scheme
    pub fn get(&self, scheme: &str) -> Option<Arc<dyn StorageBackend>> {
        self.backends.get(scheme).cloned()
    }

    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<_> = self.backends.keys().cloned().collect();
        schemes.sort_unstable();
        schemes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fa_core::DropboxConfig;

    #[test]
    fn test_from_settings_builds_every_driver() {
        let settings = BackendSettings::new()
            .with_backend("local", BackendDriver::Local { root: "/tmp".into() })
            .with_backend("memory", BackendDriver::Memory)
            .with_backend("dropbox", BackendDriver::Dropbox(DropboxConfig::default()));

        let registry = BackendRegistry::from_settings(&settings);
        assert_eq!(registry.schemes(), vec!["dropbox", "local", "memory"]);
        assert!(registry.get("local").is_some());
        assert!(registry.get("s3").is_none());
    }

    #[test]
    fn test_registered_backend_keeps_its_scheme() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(MemoryBackend::new("staging")));

        let backend = registry.get("staging").unwrap();
        assert_eq!(backend.scheme(), "staging");
    }
}
