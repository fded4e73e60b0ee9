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

//! # console-streamer
//!
//! `console-streamer` turns in-process snapshot providers ("consoles") into
//! push streams. Each subscription key gets one polling ticker that calls the
//! provider on a fixed interval and fans the resulting JSON text out to every
//! live subscriber.
//!
//! Typical usage is centered on [`ConsoleStreamer`] and a [`ProviderLookup`]
//! such as [`ProviderRegistry`].
//!
//! ## Snapshots and streams
//!
//! ```
//! use console_streamer::{
//!     ConsoleStreamer, FnProvider, OptionSet, ProviderRegistry, StreamerConfig,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let providers = ProviderRegistry::new();
//! providers.register(Arc::new(FnProvider::new("threads", |options: &OptionSet| {
//!     Ok(Some(json!({ "filter": options.get("filter"), "count": 4 })))
//! })));
//!
//! let config = StreamerConfig::default().with_update_interval(Duration::from_millis(50));
//! let streamer = ConsoleStreamer::new("quick-start", config, Arc::new(providers));
//!
//! let snapshot = streamer.get_snapshot("threads", OptionSet::new()).unwrap();
//! assert_eq!(snapshot, r#"{"count":4,"filter":null}"#);
//!
//! // Unknown keys are not an error.
//! assert_eq!(streamer.get_snapshot("no-such-key", OptionSet::new()).unwrap(), "{}");
//!
//! let mut receiver = streamer
//!     .get_stream("threads", OptionSet::new())
//!     .unwrap()
//!     .subscribe();
//! # tokio::runtime::Builder::new_current_thread()
//! #     .enable_time()
//! #     .build()
//! #     .unwrap()
//! #     .block_on(async {
//! let pushed = receiver.recv().await.unwrap();
//! assert_eq!(pushed, snapshot);
//! # });
//!
//! assert_eq!(streamer.shutdown(), 2);
//! ```
//!
//! ## Subscription contract
//!
//! - one subscription per key, created on first use and kept until
//!   [`ConsoleStreamer::deactivate`]
//! - a missing provider, an empty result or a failing provider all yield `"{}"`
//! - option updates apply to existing subscriptions only and are atomic
//! - subscribers see only payloads published after they joined
//!
//! ## Internal architecture map
//!
//! - API facade: [`ConsoleStreamer`] and [`ConsoleSubscription`]
//! - Provider boundary: provider lookup and failure-absorbing invocation
//! - Control plane: subscription-table lifecycle
//! - Data plane: recurring ticker and multicast fan-out
//! - Runtime: dedicated ticker threads and their async runtimes
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events with structured `event` and
//! `component` fields; event names live in `observability::events`. Library code
//! never initializes a global subscriber. Binaries and tests are responsible for
//! one-time `tracing_subscriber` initialization at process boundaries.

mod config;
pub use config::{StreamerConfig, DEFAULT_MESSAGE_QUEUE_SIZE, DEFAULT_UPDATE_INTERVAL_MS};

mod console_streamer;
pub use console_streamer::ConsoleStreamer;

mod control_plane;
mod data_plane;
pub use data_plane::multicast::ConsoleStream;

mod error;
pub use error::ConsoleStreamerError;

#[doc(hidden)]
pub mod observability;

mod provider;
pub use provider::{
    FnProvider, OptionSet, ProviderLookup, ProviderRegistry, SnapshotError, SnapshotProvider,
    EMPTY_SNAPSHOT,
};

mod runtime;

mod subscription;
pub use subscription::ConsoleSubscription;
