/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
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

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MESSAGE_QUEUE_SIZE: u16 = 16;

/// Tunables shared by every subscription a [`crate::ConsoleStreamer`] creates.
///
/// The update interval is read once when a subscription is created; changing the
/// configuration later only affects subscriptions created afterwards.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StreamerConfig {
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Per-subscriber buffer before the oldest unread payloads are dropped.
    #[serde(default = "default_message_queue_size")]
    pub message_queue_size: u16,
}

fn default_update_interval_ms() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

fn default_message_queue_size() -> u16 {
    DEFAULT_MESSAGE_QUEUE_SIZE
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            message_queue_size: DEFAULT_MESSAGE_QUEUE_SIZE,
        }
    }
}

impl StreamerConfig {
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_message_queue_size(mut self, message_queue_size: u16) -> Self {
        self.message_queue_size = message_queue_size;
        self
    }

    /// Tick period; zero is raised to one millisecond since a timer cannot fire
    /// with a zero period.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.max(1))
    }

    /// Broadcast capacity; zero is raised to one.
    pub fn queue_capacity(&self) -> usize {
        usize::from(self.message_queue_size.max(1))
    }
}
