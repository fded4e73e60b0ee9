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

//! Canonical structured field keys and value-format helpers.

use crate::provider::OptionSet;

pub const NONE: &str = "none";
pub const REASON_CANCELLED: &str = "cancelled";
pub const REASON_STOP_SIGNAL: &str = "stop_signal";
pub const REASON_HANDLE_DROPPED: &str = "handle_dropped";
pub const DEFAULT_WORKER_THREAD: &str = "unknown-thread";

/// Longest payload prefix written into debug events.
pub const PAYLOAD_PREVIEW_MAX_LEN: usize = 256;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    pub worker_id: String,
    pub worker_thread: String,
}

impl WorkerContext {
    pub fn new(worker_id: impl Into<String>, worker_thread: Option<&str>) -> Self {
        Self {
            worker_id: worker_id.into(),
            worker_thread: thread_name_or_default(worker_thread),
        }
    }

    pub fn with_current_thread(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            worker_thread: current_thread_name_or_default(),
        }
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_WORKER_THREAD).to_string()
}

pub fn current_thread_name_or_default() -> String {
    thread_name_or_default(std::thread::current().name())
}

/// Renders option keys in sorted order; values are left out of logs.
pub fn format_option_keys(options: &OptionSet) -> String {
    if options.is_empty() {
        return NONE.to_string();
    }
    let mut keys: Vec<&str> = options.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys.join(",")
}

pub fn payload_preview(payload: &str) -> &str {
    if payload.len() <= PAYLOAD_PREVIEW_MAX_LEN {
        return payload;
    }
    let mut end = PAYLOAD_PREVIEW_MAX_LEN;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    &payload[..end]
}
