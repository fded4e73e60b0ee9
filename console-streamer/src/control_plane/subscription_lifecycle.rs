//! Subscription-table lifecycle primitives for the control plane.

use crate::error::ConsoleStreamerError;
use crate::provider::OptionSet;
use crate::subscription::ConsoleSubscription;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

pub(crate) type SubscriptionTable = DashMap<String, Arc<ConsoleSubscription>>;

/// Returns the live subscription for `key`, creating it with `create` when
/// absent.
///
/// `create` runs at most once per absent key, under the key's shard lock, so
/// concurrent callers for the same key all get the same instance. An entry whose
/// handle was cancelled directly counts as absent and is replaced. The `bool` is
/// `true` for the caller whose `create` ran.
pub(crate) fn get_or_create_subscription<F>(
    subscriptions: &SubscriptionTable,
    key: &str,
    create: F,
) -> Result<(Arc<ConsoleSubscription>, bool), ConsoleStreamerError>
where
    F: FnOnce() -> Result<ConsoleSubscription, ConsoleStreamerError>,
{
    if let Some(existing) = subscriptions.get(key) {
        if !existing.is_cancelled() {
            return Ok((existing.value().clone(), false));
        }
    }

    match subscriptions.entry(key.to_string()) {
        Entry::Occupied(mut occupied) => {
            if !occupied.get().is_cancelled() {
                return Ok((occupied.get().clone(), false));
            }
            let subscription = Arc::new(create()?);
            occupied.insert(subscription.clone());
            Ok((subscription, true))
        }
        Entry::Vacant(vacant) => {
            let subscription = Arc::new(create()?);
            vacant.insert(subscription.clone());
            Ok((subscription, true))
        }
    }
}

/// The live subscription for `key`, if any.
pub(crate) fn live_subscription(
    subscriptions: &SubscriptionTable,
    key: &str,
) -> Option<Arc<ConsoleSubscription>> {
    subscriptions
        .get(key)
        .filter(|subscription| !subscription.is_cancelled())
        .map(|subscription| subscription.value().clone())
}

/// Replaces the options of a live subscription; never creates one.
///
/// The shard read guard is held for the update, so a concurrent removal of the
/// same key waits for it.
pub(crate) fn update_subscription_options(
    subscriptions: &SubscriptionTable,
    key: &str,
    options: OptionSet,
) -> bool {
    match subscriptions.get(key) {
        Some(subscription) if !subscription.is_cancelled() => {
            subscription.value().update_options(options);
            true
        }
        _ => false,
    }
}

pub(crate) fn remove_subscription(
    subscriptions: &SubscriptionTable,
    key: &str,
) -> Option<Arc<ConsoleSubscription>> {
    subscriptions
        .remove(key)
        .map(|(_, subscription)| subscription)
}

#[cfg(test)]
mod tests {
    use super::{
        get_or_create_subscription, live_subscription, remove_subscription,
        update_subscription_options, SubscriptionTable,
    };
    use crate::config::StreamerConfig;
    use crate::error::ConsoleStreamerError;
    use crate::provider::{OptionSet, ProviderRegistry};
    use crate::subscription::ConsoleSubscription;
    use serde_json::json;
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    fn make_subscription(key: &str) -> Result<ConsoleSubscription, ConsoleStreamerError> {
        ConsoleSubscription::new(
            key,
            OptionSet::new(),
            &StreamerConfig::default().with_update_interval(Duration::from_secs(3600)),
            Arc::new(ProviderRegistry::new()),
        )
    }

    #[test]
    fn get_or_create_runs_factory_once_per_key() {
        let subscriptions = SubscriptionTable::new();

        let (first, first_created) =
            get_or_create_subscription(&subscriptions, "routes", || make_subscription("routes"))
                .expect("first insert succeeds");
        let (second, second_created) = get_or_create_subscription(&subscriptions, "routes", || {
            panic!("factory must not run for an existing key")
        })
        .expect("second lookup succeeds");

        assert!(first_created);
        assert!(!second_created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(subscriptions.len(), 1);
    }

    #[test]
    fn failed_factory_leaves_no_entry() {
        let subscriptions = SubscriptionTable::new();

        let result = get_or_create_subscription(&subscriptions, "routes", || {
            Err(ConsoleStreamerError::scheduler(
                "routes",
                io::Error::new(io::ErrorKind::Other, "no threads left"),
            ))
        });

        assert!(result.is_err());
        assert!(subscriptions.is_empty());
    }

    #[test]
    fn update_only_touches_existing_entries() {
        let subscriptions = SubscriptionTable::new();
        let mut options = OptionSet::new();
        options.insert("a".to_string(), json!("1"));

        assert!(!update_subscription_options(
            &subscriptions,
            "routes",
            options.clone()
        ));
        assert!(subscriptions.is_empty());

        get_or_create_subscription(&subscriptions, "routes", || make_subscription("routes"))
            .expect("insert succeeds");

        assert!(update_subscription_options(
            &subscriptions,
            "routes",
            options.clone()
        ));
        let subscription = subscriptions.get("routes").expect("entry present");
        assert_eq!(*subscription.options(), options);
    }

    #[test]
    fn remove_subscription_is_idempotent() {
        let subscriptions = SubscriptionTable::new();
        get_or_create_subscription(&subscriptions, "routes", || make_subscription("routes"))
            .expect("insert succeeds");

        assert!(remove_subscription(&subscriptions, "routes").is_some());
        assert!(remove_subscription(&subscriptions, "routes").is_none());
    }

    #[test]
    fn cancelled_entry_is_replaced_and_not_updated() {
        let subscriptions = SubscriptionTable::new();
        let (stale, _) =
            get_or_create_subscription(&subscriptions, "routes", || make_subscription("routes"))
                .expect("insert succeeds");
        stale.cancel();

        assert!(live_subscription(&subscriptions, "routes").is_none());
        assert!(!update_subscription_options(
            &subscriptions,
            "routes",
            OptionSet::new()
        ));

        let (fresh, created) =
            get_or_create_subscription(&subscriptions, "routes", || make_subscription("routes"))
                .expect("replacement succeeds");

        assert!(created);
        assert!(!Arc::ptr_eq(&stale, &fresh));
        assert!(!fresh.is_cancelled());
        assert_eq!(subscriptions.len(), 1);
        assert!(Arc::ptr_eq(
            &live_subscription(&subscriptions, "routes").expect("live entry"),
            &fresh
        ));
    }
}
