/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use crate::config::StreamerConfig;
use crate::control_plane::subscription_lifecycle::{
    get_or_create_subscription, live_subscription, remove_subscription,
    update_subscription_options, SubscriptionTable,
};
use crate::data_plane::multicast::ConsoleStream;
use crate::error::ConsoleStreamerError;
use crate::observability::{events, fields};
use crate::provider::invocation;
use crate::provider::{OptionSet, ProviderLookup};
use crate::subscription::ConsoleSubscription;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "console_streamer";

/// Registry of live console subscriptions, keyed by subscription key.
///
/// Entries are created lazily by [`Self::get_snapshot`], [`Self::get_stream`] or
/// [`Self::get_or_create`] and live until [`Self::deactivate`] or
/// [`Self::shutdown`]. All methods take `&self` and may be called from any thread.
pub struct ConsoleStreamer {
    name: String,
    config: StreamerConfig,
    providers: Arc<dyn ProviderLookup>,
    subscriptions: SubscriptionTable,
}

impl ConsoleStreamer {
    pub fn new(name: &str, config: StreamerConfig, providers: Arc<dyn ProviderLookup>) -> Self {
        info!(
            event = events::STREAMER_CREATE,
            component = COMPONENT,
            streamer = name,
            update_interval_ms = config.update_interval_ms,
            message_queue_size = config.message_queue_size,
            "console streamer created"
        );

        Self {
            name: name.to_string(),
            config,
            providers,
            subscriptions: SubscriptionTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    pub fn providers(&self) -> &Arc<dyn ProviderLookup> {
        &self.providers
    }

    /// Returns the entry for `key`, creating and scheduling it when absent.
    ///
    /// Concurrent callers for the same key all receive the same entry; only the
    /// winner's `options` are used, the others are discarded.
    pub fn get_or_create(
        &self,
        key: &str,
        options: OptionSet,
    ) -> Result<Arc<ConsoleSubscription>, ConsoleStreamerError> {
        let created = get_or_create_subscription(&self.subscriptions, key, || {
            ConsoleSubscription::new(key, options, &self.config, self.providers.clone())
        });

        match created {
            Ok((subscription, true)) => Ok(subscription),
            Ok((subscription, false)) => {
                debug!(
                    event = events::SUBSCRIPTION_REUSE,
                    component = COMPONENT,
                    streamer = self.name.as_str(),
                    key,
                    worker_id = subscription.worker_id(),
                    "existing subscription reused"
                );
                Ok(subscription)
            }
            Err(err) => {
                warn!(
                    event = events::SUBSCRIPTION_CREATE_FAILED,
                    component = COMPONENT,
                    streamer = self.name.as_str(),
                    key,
                    err = %err,
                    "unable to create subscription"
                );
                Err(err)
            }
        }
    }

    /// Takes a snapshot for `key` now.
    ///
    /// This registers a polling subscription for `key` if none exists yet, which
    /// keeps ticking until deactivated. Use [`Self::peek_snapshot`] for a one-off
    /// read that leaves the registry untouched.
    pub fn get_snapshot(
        &self,
        key: &str,
        options: OptionSet,
    ) -> Result<String, ConsoleStreamerError> {
        Ok(self.get_or_create(key, options)?.invoke_snapshot())
    }

    /// One-off snapshot that never creates a subscription.
    ///
    /// Uses the live entry's options when one exists, `options` otherwise.
    pub fn peek_snapshot(&self, key: &str, options: OptionSet) -> String {
        match self.get(key) {
            Some(subscription) => subscription.invoke_snapshot(),
            None => invocation::invoke_snapshot(self.providers.as_ref(), key, &options),
        }
    }

    /// The multicast stream for `key`; same key, same stream.
    pub fn get_stream(
        &self,
        key: &str,
        options: OptionSet,
    ) -> Result<ConsoleStream, ConsoleStreamerError> {
        Ok(self.get_or_create(key, options)?.stream())
    }

    /// Replaces the options of an existing subscription. Returns `false`, and
    /// creates nothing, when `key` has no subscription.
    pub fn update_options(&self, key: &str, options: OptionSet) -> bool {
        let option_keys = fields::format_option_keys(&options);
        let updated = update_subscription_options(&self.subscriptions, key, options);
        if !updated {
            debug!(
                event = events::SUBSCRIPTION_OPTIONS_UPDATE_MISSING,
                component = COMPONENT,
                streamer = self.name.as_str(),
                key,
                option_keys = %option_keys,
                "no subscription to update"
            );
        }
        updated
    }

    /// Removes the subscription for `key` and stops its ticker.
    ///
    /// Returns `false` when there was nothing to remove. Subscribers already
    /// attached keep their streams until the entry is dropped; nothing more is
    /// published to them.
    pub fn deactivate(&self, key: &str) -> bool {
        match remove_subscription(&self.subscriptions, key) {
            Some(subscription) => {
                subscription.cancel();
                debug!(
                    event = events::SUBSCRIPTION_DEACTIVATE,
                    component = COMPONENT,
                    streamer = self.name.as_str(),
                    key,
                    worker_id = subscription.worker_id(),
                    subscribers = subscription.subscriber_count(),
                    "subscription deactivated"
                );
                true
            }
            None => {
                debug!(
                    event = events::SUBSCRIPTION_DEACTIVATE_MISSING,
                    component = COMPONENT,
                    streamer = self.name.as_str(),
                    key,
                    "no subscription to deactivate"
                );
                false
            }
        }
    }

    /// The live entry for `key`. An entry whose handle was cancelled directly is
    /// treated as absent until it is replaced or deactivated.
    pub fn get(&self, key: &str) -> Option<Arc<ConsoleSubscription>> {
        live_subscription(&self.subscriptions, key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|subscription| !subscription.is_cancelled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys with a live subscription, sorted.
    pub fn active_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .subscriptions
            .iter()
            .filter(|subscription| !subscription.is_cancelled())
            .map(|subscription| subscription.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// Deactivates every subscription and returns how many were removed.
    pub fn shutdown(&self) -> usize {
        let keys: Vec<String> = self
            .subscriptions
            .iter()
            .map(|subscription| subscription.key().clone())
            .collect();
        let deactivated = keys.iter().filter(|key| self.deactivate(key)).count();

        info!(
            event = events::REGISTRY_SHUTDOWN,
            component = COMPONENT,
            streamer = self.name.as_str(),
            deactivated,
            "console streamer shut down"
        );
        deactivated
    }
}

impl Debug for ConsoleStreamer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleStreamer")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}
