use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::event_sourcing::store::CosmosEventStore;

// ============================================================================
// Named Singleton Registry
// ============================================================================
//
// Each entry holds a factory and the instance it produced. The factory runs
// on first resolve only; every later resolve returns the same Arc.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry key cannot be empty")]
    EmptyKey,
}

type Factory<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;

struct Entry<T> {
    factory: Factory<T>,
    instance: OnceLock<Arc<T>>,
}

impl<T> Entry<T> {
    fn get(&self) -> Arc<T> {
        Arc::clone(self.instance.get_or_init(|| (self.factory)()))
    }
}

pub struct SingletonRegistry<T> {
    entries: RwLock<HashMap<String, Arc<Entry<T>>>>,
}

/// Registry of event store handles keyed by bounded context.
pub type EventStoreRegistry = SingletonRegistry<CosmosEventStore>;

impl<T> SingletonRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a lazily instantiated singleton under `key`.
    ///
    /// A second registration under the same key replaces the first.
    pub fn register_singleton<F>(&self, key: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RegistryError::EmptyKey);
        }

        let entry = Arc::new(Entry {
            factory: Box::new(factory),
            instance: OnceLock::new(),
        });

        let replaced = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), entry)
            .is_some();

        if replaced {
            tracing::warn!(key = %key, "Replaced existing singleton registration");
        } else {
            tracing::debug!(key = %key, "Registered singleton");
        }

        Ok(())
    }

    /// Resolve the singleton registered under `key`, creating it on first use.
    pub fn resolve(&self, key: &str) -> Option<Arc<T>> {
        let entry = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;

        // Lock released before the factory runs
        Some(entry.get())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for SingletonRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SingletonRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_factory_runs_once_and_resolves_same_instance() {
        let registry: SingletonRegistry<String> = SingletonRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        registry
            .register_singleton("Orders", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new("orders-store".to_string())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0); // lazy

        let first = registry.resolve("Orders").unwrap();
        let second = registry.resolve("Orders").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let registry: SingletonRegistry<String> = SingletonRegistry::new();

        let result = registry.register_singleton("  ", || Arc::new(String::new()));

        assert!(matches!(result, Err(RegistryError::EmptyKey)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_key_resolves_to_none() {
        let registry: SingletonRegistry<String> = SingletonRegistry::new();
        assert!(registry.resolve("Missing").is_none());
        assert!(!registry.contains("Missing"));
    }

    #[test]
    fn test_keys_are_independent_and_replaceable() {
        let registry: SingletonRegistry<String> = SingletonRegistry::new();
        registry.register_singleton("Billing", || Arc::new("v1".to_string())).unwrap();
        registry.register_singleton("Orders", || Arc::new("orders".to_string())).unwrap();
        registry.register_singleton("Billing", || Arc::new("v2".to_string())).unwrap();

        assert_eq!(registry.keys(), vec!["Billing".to_string(), "Orders".to_string()]);
        assert_eq!(registry.resolve("Billing").unwrap().as_str(), "v2");
        assert_eq!(registry.resolve("Orders").unwrap().as_str(), "orders");
    }
}
