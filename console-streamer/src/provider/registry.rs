//! Keyed provider directory used as the default [`ProviderLookup`].

use crate::observability::events;
use crate::provider::{ProviderLookup, SnapshotProvider};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "provider_registry";

/// Concurrent map of provider id to provider.
///
/// Providers may be registered and removed while subscriptions are live; each
/// poll resolves its key again, so a provider registered after a subscription was
/// created is picked up on the next tick.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn SnapshotProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own id, replacing any previous one.
    ///
    /// Returns `true` when an earlier provider was replaced.
    pub fn register(&self, provider: Arc<dyn SnapshotProvider>) -> bool {
        let id = provider.id().to_string();
        let replaced = self.providers.insert(id.clone(), provider).is_some();
        let event = if replaced {
            events::PROVIDER_REPLACE
        } else {
            events::PROVIDER_REGISTER
        };
        debug!(
            event,
            component = COMPONENT,
            key = id.as_str(),
            "provider registered"
        );
        replaced
    }

    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.providers.remove(id).is_some();
        if removed {
            debug!(
                event = events::PROVIDER_UNREGISTER,
                component = COMPONENT,
                key = id,
                "provider unregistered"
            );
        }
        removed
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .providers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderLookup for ProviderRegistry {
    fn lookup(&self, key: &str) -> Option<Arc<dyn SnapshotProvider>> {
        self.providers.get(key).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderRegistry;
    use crate::provider::{FnProvider, OptionSet, ProviderLookup, SnapshotProvider};
    use serde_json::json;
    use std::sync::Arc;

    fn constant_provider(id: &str, value: i64) -> Arc<dyn SnapshotProvider> {
        Arc::new(FnProvider::new(id, move |_options: &OptionSet| {
            Ok(Some(json!({ "value": value })))
        }))
    }

    #[test]
    fn register_replaces_provider_with_same_id() {
        let registry = ProviderRegistry::new();

        assert!(!registry.register(constant_provider("health", 1)));
        assert!(registry.register(constant_provider("health", 2)));
        assert_eq!(registry.len(), 1);

        let provider = registry.lookup("health").expect("health provider registered");
        assert_eq!(
            provider.snapshot(&OptionSet::new()).expect("constant succeeds"),
            Some(json!({ "value": 2 }))
        );
    }

    #[test]
    fn unregister_is_idempotent_and_ids_are_sorted() {
        let registry = ProviderRegistry::new();
        registry.register(constant_provider("routes", 1));
        registry.register(constant_provider("context", 1));

        assert_eq!(registry.ids(), vec!["context".to_string(), "routes".to_string()]);
        assert!(registry.unregister("routes"));
        assert!(!registry.unregister("routes"));
        assert!(registry.lookup("routes").is_none());
        assert!(!registry.is_empty());
    }
}
