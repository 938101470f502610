//! Backend registry for managing available backends.
//!
//! The [`BackendRegistry`] maps backend names to factories so callers can
//! bind a backend from a [`BackendConfig`] alone.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::{Backend, BackendConfig, BackendFactory};
use crate::error::{HalError, HalResult};

/// Factory function type for registered backends.
type Factory = Box<dyn Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync>;

/// Central registry of photonic backends.
pub struct BackendRegistry {
    factories: FxHashMap<String, Factory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a backend type implementing [`BackendFactory`].
    pub fn register<B>(&mut self, name: impl Into<String>)
    where
        B: BackendFactory + Backend + 'static,
    {
        let name = name.into();
        debug!("Registering backend: {}", name);
        self.factories.insert(
            name,
            Box::new(|config| {
                let backend = B::from_config(config)?;
                Ok(Box::new(backend))
            }),
        );
    }

    /// Register a backend factory with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering factory backend: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Create a backend from its configuration, looked up by `config.name`.
    pub fn create(&self, config: BackendConfig) -> HalResult<Box<dyn Backend>> {
        if config.name.is_empty() {
            return Err(HalError::Configuration("backend name is empty".into()));
        }
        match self.factories.get(&config.name) {
            Some(factory) => factory(config),
            None => Err(HalError::Configuration(format!(
                "no backend registered with name '{}' (available: {})",
                config.name,
                self.available_backends().join(", ")
            ))),
        }
    }

    /// List all available backend names, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend is available by name.
    pub fn has_backend(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = BackendRegistry::new();
        assert!(registry.available_backends().is_empty());
        assert!(!registry.has_backend("simulator"));
    }

    #[test]
    fn test_register_factory() {
        let mut registry = BackendRegistry::new();
        registry.register_factory("test", |_config| {
            Err(HalError::Unsupported("test only".into()))
        });

        assert!(registry.has_backend("test"));
        assert_eq!(registry.available_backends(), vec!["test"]);
        let err = registry.create(BackendConfig::new("test")).err().unwrap();
        assert!(matches!(err, HalError::Unsupported(_)));
    }

    #[test]
    fn test_create_unknown_backend() {
        let registry = BackendRegistry::new();
        let result = registry.create(BackendConfig::new("nonexistent"));
        assert!(matches!(result, Err(HalError::Configuration(_))));
        let result = registry.create(BackendConfig::new(""));
        assert!(matches!(result, Err(HalError::Configuration(msg)) if msg.contains("empty")));
    }

    #[test]
    fn test_available_backends_sorted() {
        let mut registry = BackendRegistry::new();
        registry.register_factory("zebra", |_| {
            Err(HalError::Unsupported("test".into()))
        });
        registry.register_factory("alpha", |_| {
            Err(HalError::Unsupported("test".into()))
        });

        assert_eq!(registry.available_backends(), vec!["alpha", "zebra"]);
    }
}
