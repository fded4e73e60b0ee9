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

//! Recurring ticker that polls a subscription's provider and publishes the result.

use crate::observability::events;
use crate::observability::fields::{self, WorkerContext};
use crate::runtime::tick_runtime::{
    spawn_tick_loop, TickLoopHandle, DEFAULT_TICK_RUNTIME_THREAD_NAME,
};
use crate::subscription::SubscriptionCore;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};
use uuid::Uuid;

const TICK_RUNTIME_THREAD_NAME_PREFIX: &str = "console-";
const TICK_RUNTIME_THREAD_NAME_MAX_LEN: usize = 15;
const COMPONENT: &str = "ticker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Published(usize),
    Discarded,
}

/// Ticker state that owns the spawned tick-loop thread handle.
pub(crate) struct SnapshotTicker {
    worker_id: String,
    loop_handle: TickLoopHandle,
}

impl SnapshotTicker {
    /// Spawns a dedicated runtime thread for one subscription's tick loop.
    ///
    /// The first tick fires one `period` after this returns.
    pub(crate) fn start(
        core: Arc<SubscriptionCore>,
        period: Duration,
        stop: oneshot::Receiver<()>,
    ) -> io::Result<Self> {
        let worker_id = Uuid::new_v4().simple().to_string();
        let runtime_thread_name = Self::build_runtime_thread_name(&worker_id);
        let worker_id_for_loop = worker_id.clone();

        let loop_handle = spawn_tick_loop(runtime_thread_name, move || async move {
            Self::tick_loop(worker_id_for_loop, core, period, stop).await;
        })?;

        Ok(Self {
            worker_id,
            loop_handle,
        })
    }

    pub(crate) fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub(crate) fn runtime_thread(&self) -> &str {
        self.loop_handle.worker_thread()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.loop_handle.is_finished()
    }

    fn build_runtime_thread_name(worker_id: &str) -> String {
        let suffix_len = TICK_RUNTIME_THREAD_NAME_MAX_LEN - TICK_RUNTIME_THREAD_NAME_PREFIX.len();
        let suffix: String = worker_id
            .chars()
            .filter(|ch| ch.is_ascii_hexdigit())
            .take(suffix_len)
            .collect();

        if suffix.len() == suffix_len {
            format!("{TICK_RUNTIME_THREAD_NAME_PREFIX}{suffix}")
        } else {
            DEFAULT_TICK_RUNTIME_THREAD_NAME.to_string()
        }
    }

    /// Runs until the stop signal fires, its sender is dropped, or a tick finds
    /// the subscription cancelled.
    pub(crate) async fn tick_loop(
        worker_id: String,
        core: Arc<SubscriptionCore>,
        period: Duration,
        mut stop: oneshot::Receiver<()>,
    ) {
        let worker_context = WorkerContext::with_current_thread(worker_id);
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            event = events::TICKER_START,
            component = COMPONENT,
            worker_id = worker_context.worker_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            key = core.key(),
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "ticker started"
        );

        let reason = loop {
            tokio::select! {
                biased;
                _ = &mut stop => break fields::REASON_STOP_SIGNAL,
                _ = interval.tick() => {
                    if Self::publish_tick(&core, &worker_context) == TickOutcome::Discarded {
                        break fields::REASON_CANCELLED;
                    }
                }
            }
        };

        info!(
            event = events::TICKER_STOP,
            component = COMPONENT,
            worker_id = worker_context.worker_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            key = core.key(),
            reason,
            "ticker stopped"
        );
    }

    /// One tick: snapshot outside the monitor, publish under it.
    ///
    /// The provider call may block for a long time and must not hold up `cancel`;
    /// the publish re-checks the cancelled flag so nothing is published once
    /// `cancel` has returned.
    pub(crate) fn publish_tick(
        core: &SubscriptionCore,
        worker_context: &WorkerContext,
    ) -> TickOutcome {
        let payload = core.invoke_snapshot();

        let state = core.lock_monitor();
        if state.is_cancelled() {
            debug!(
                event = events::TICK_DISCARDED_AFTER_CANCEL,
                component = COMPONENT,
                worker_id = worker_context.worker_id.as_str(),
                key = core.key(),
                "subscription cancelled during tick; payload discarded"
            );
            return TickOutcome::Discarded;
        }

        let subscribers = core.publisher().publish(payload);
        drop(state);

        if subscribers == 0 {
            trace!(
                event = events::TICK_NO_SUBSCRIBERS,
                component = COMPONENT,
                worker_id = worker_context.worker_id.as_str(),
                key = core.key(),
                "no subscribers; payload dropped"
            );
        } else {
            trace!(
                event = events::TICK_PUBLISH,
                component = COMPONENT,
                worker_id = worker_context.worker_id.as_str(),
                key = core.key(),
                subscribers,
                "payload published"
            );
        }
        TickOutcome::Published(subscribers)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        SnapshotTicker, TickOutcome, TICK_RUNTIME_THREAD_NAME_MAX_LEN,
        TICK_RUNTIME_THREAD_NAME_PREFIX,
    };
    use crate::observability::fields::WorkerContext;
    use crate::provider::{FnProvider, OptionSet, ProviderRegistry, EMPTY_SNAPSHOT};
    use crate::subscription::SubscriptionCore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::Instant;

    fn counting_core(calls: Arc<AtomicUsize>) -> Arc<SubscriptionCore> {
        let providers = ProviderRegistry::new();
        providers.register(Arc::new(FnProvider::new("counter", move |_options: &OptionSet| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Some(json!({ "call": call })))
        })));
        Arc::new(SubscriptionCore::new(
            "counter",
            OptionSet::new(),
            Arc::new(providers),
            8,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_fires_after_one_period() {
        let calls = Arc::new(AtomicUsize::new(0));
        let core = counting_core(calls.clone());
        let mut receiver = core.publisher().stream().subscribe();
        let (stop_tx, stop_rx) = oneshot::channel();
        let period = Duration::from_millis(100);

        let started = Instant::now();
        let task = tokio::spawn(SnapshotTicker::tick_loop(
            "paused".to_string(),
            core.clone(),
            period,
            stop_rx,
        ));

        let payload = receiver.recv().await.expect("first tick published");
        assert!(started.elapsed() >= period);
        assert_eq!(payload, r#"{"call":1}"#);

        stop_tx.send(()).expect("tick loop still running");
        task.await.expect("tick loop exits cleanly");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_stop_sender_ends_loop() {
        let core = counting_core(Arc::new(AtomicUsize::new(0)));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        drop(stop_tx);

        SnapshotTicker::tick_loop(
            "dropped".to_string(),
            core,
            Duration::from_millis(10),
            stop_rx,
        )
        .await;
    }

    #[test]
    fn publish_tick_discards_payload_once_cancelled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let core = counting_core(calls.clone());
        let mut receiver = core.publisher().stream().subscribe();
        let context = WorkerContext::new("cancelled", None);

        assert_eq!(
            SnapshotTicker::publish_tick(&core, &context),
            TickOutcome::Published(1)
        );
        core.lock_monitor().mark_cancelled();
        assert_eq!(
            SnapshotTicker::publish_tick(&core, &context),
            TickOutcome::Discarded
        );

        assert_eq!(receiver.try_recv().expect("first tick delivered"), r#"{"call":1}"#);
        assert!(receiver.try_recv().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn publish_tick_without_provider_publishes_empty_snapshot() {
        let core = SubscriptionCore::new(
            "missing",
            OptionSet::new(),
            Arc::new(ProviderRegistry::new()),
            8,
        );
        let mut receiver = core.publisher().stream().subscribe();

        SnapshotTicker::publish_tick(&core, &WorkerContext::new("missing", None));

        assert_eq!(receiver.try_recv().expect("tick delivered"), EMPTY_SNAPSHOT);
    }

    #[test]
    fn build_runtime_thread_name_keeps_prefix_and_linux_safe_length() {
        let thread_name = SnapshotTicker::build_runtime_thread_name("abcdef0123456789");

        assert!(thread_name.starts_with(TICK_RUNTIME_THREAD_NAME_PREFIX));
        assert_eq!(thread_name.len(), TICK_RUNTIME_THREAD_NAME_MAX_LEN);
    }

    #[test]
    fn build_runtime_thread_name_uses_fallback_for_short_non_hex_ids() {
        let thread_name = SnapshotTicker::build_runtime_thread_name("zzz");

        assert_eq!(
            thread_name,
            crate::runtime::tick_runtime::DEFAULT_TICK_RUNTIME_THREAD_NAME
        );
    }
}
