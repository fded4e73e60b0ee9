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

//! One polling and fan-out unit: a key, its options, a ticker and a stream.

use crate::config::StreamerConfig;
use crate::data_plane::multicast::{ConsoleStream, SnapshotPublisher};
use crate::data_plane::ticker::SnapshotTicker;
use crate::error::ConsoleStreamerError;
use crate::observability::{events, fields};
use crate::provider::invocation;
use crate::provider::{OptionSet, ProviderLookup, SnapshotError};
use arc_swap::ArcSwap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

const COMPONENT: &str = "subscription";

/// Per-entry monitor state; publish and cancel are serialized on it.
pub(crate) struct TickerState {
    cancelled: bool,
    stop: Option<oneshot::Sender<()>>,
}

impl TickerState {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns `true` only for the call that performed the transition.
    pub(crate) fn mark_cancelled(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        true
    }
}

/// State shared between a subscription handle and its tick loop.
pub(crate) struct SubscriptionCore {
    key: String,
    options: ArcSwap<OptionSet>,
    providers: Arc<dyn ProviderLookup>,
    publisher: SnapshotPublisher,
    monitor: Mutex<TickerState>,
}

impl SubscriptionCore {
    #[cfg(test)]
    pub(crate) fn new(
        key: &str,
        options: OptionSet,
        providers: Arc<dyn ProviderLookup>,
        queue_capacity: usize,
    ) -> Self {
        Self::with_stop(key, options, providers, queue_capacity, None)
    }

    fn with_stop(
        key: &str,
        options: OptionSet,
        providers: Arc<dyn ProviderLookup>,
        queue_capacity: usize,
        stop: Option<oneshot::Sender<()>>,
    ) -> Self {
        Self {
            key: key.to_string(),
            options: ArcSwap::from_pointee(options),
            providers,
            publisher: SnapshotPublisher::new(queue_capacity),
            monitor: Mutex::new(TickerState {
                cancelled: false,
                stop,
            }),
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }

    pub(crate) fn lock_monitor(&self) -> MutexGuard<'_, TickerState> {
        self.monitor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The whole option set in effect at the time of the call.
    pub(crate) fn options(&self) -> Arc<OptionSet> {
        self.options.load_full()
    }

    pub(crate) fn try_snapshot(&self) -> Result<Option<String>, SnapshotError> {
        let options = self.options();
        invocation::try_snapshot(self.providers.as_ref(), &self.key, &options)
    }

    pub(crate) fn invoke_snapshot(&self) -> String {
        let options = self.options();
        invocation::invoke_snapshot(self.providers.as_ref(), &self.key, &options)
    }
}

/// A live subscription: polls the provider for its key every interval and
/// publishes each snapshot to the subscription's [`ConsoleStream`].
///
/// Dropping the last handle cancels the ticker.
pub struct ConsoleSubscription {
    core: Arc<SubscriptionCore>,
    ticker: SnapshotTicker,
    interval: Duration,
}

impl ConsoleSubscription {
    /// Creates the subscription and schedules its ticker.
    ///
    /// Does not take a first snapshot; the first tick fires one interval later.
    pub fn new(
        key: &str,
        options: OptionSet,
        config: &StreamerConfig,
        providers: Arc<dyn ProviderLookup>,
    ) -> Result<Self, ConsoleStreamerError> {
        let interval = config.update_interval();
        let (stop_tx, stop_rx) = oneshot::channel();
        let core = Arc::new(SubscriptionCore::with_stop(
            key,
            options,
            providers,
            config.queue_capacity(),
            Some(stop_tx),
        ));

        let ticker = SnapshotTicker::start(core.clone(), interval, stop_rx)
            .map_err(|err| ConsoleStreamerError::scheduler(key, err))?;

        debug!(
            event = events::SUBSCRIPTION_CREATE,
            component = COMPONENT,
            key,
            worker_id = ticker.worker_id(),
            worker_thread = ticker.runtime_thread(),
            option_keys = %fields::format_option_keys(&core.options()),
            "subscription created"
        );

        Ok(Self {
            core,
            ticker,
            interval,
        })
    }

    pub fn key(&self) -> &str {
        self.core.key()
    }

    pub fn options(&self) -> Arc<OptionSet> {
        self.core.options()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn worker_id(&self) -> &str {
        self.ticker.worker_id()
    }

    /// Takes a snapshot now, bypassing the ticker. Never fails: a missing
    /// provider, an empty result or a provider failure all yield `"{}"`.
    pub fn invoke_snapshot(&self) -> String {
        self.core.invoke_snapshot()
    }

    /// Like [`Self::invoke_snapshot`] but keeps the failure visible.
    pub fn try_snapshot(&self) -> Result<Option<String>, SnapshotError> {
        self.core.try_snapshot()
    }

    /// Replaces the option set. A concurrent snapshot sees either the previous
    /// set or this one in full.
    pub fn update_options(&self, options: OptionSet) {
        let _state = self.core.lock_monitor();
        debug!(
            event = events::SUBSCRIPTION_OPTIONS_UPDATE,
            component = COMPONENT,
            key = self.key(),
            option_keys = %fields::format_option_keys(&options),
            "subscription options replaced"
        );
        self.core.options.store(Arc::new(options));
    }

    pub fn stream(&self) -> ConsoleStream {
        self.core.publisher().stream()
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.publisher().subscriber_count()
    }

    /// Stops the ticker. Idempotent; once this returns nothing more is published.
    ///
    /// A snapshot already running on the ticker thread is allowed to finish and
    /// its result is dropped.
    pub fn cancel(&self) {
        self.cancel_with_reason(fields::REASON_CANCELLED);
    }

    pub fn is_cancelled(&self) -> bool {
        self.core.lock_monitor().is_cancelled()
    }

    /// Whether the ticker thread is still alive. It exits shortly after
    /// [`Self::cancel`].
    pub fn is_ticker_running(&self) -> bool {
        !self.ticker.is_finished()
    }

    fn cancel_with_reason(&self, reason: &str) {
        let transitioned = self.core.lock_monitor().mark_cancelled();
        if transitioned {
            debug!(
                event = events::SUBSCRIPTION_CANCEL,
                component = COMPONENT,
                key = self.key(),
                worker_id = self.worker_id(),
                reason,
                "subscription cancelled"
            );
        }
    }
}

impl Drop for ConsoleSubscription {
    fn drop(&mut self) {
        self.cancel_with_reason(fields::REASON_HANDLE_DROPPED);
    }
}

impl Debug for ConsoleSubscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSubscription")
            .field("key", &self.key())
            .field("worker_id", &self.worker_id())
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
