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

//! Control-plane layer.
//!
//! Owns the key-to-subscription table and its lifecycle transitions: atomic
//! create-if-absent, update-if-present and remove. Only operations on the same
//! key contend; unrelated keys live in different shards of the table.
//!
//! ```
//! use console_streamer::{ConsoleStreamer, OptionSet, ProviderRegistry, StreamerConfig};
//! use std::sync::Arc;
//!
//! let streamer = ConsoleStreamer::new(
//!     "control-plane-doc",
//!     StreamerConfig::default(),
//!     Arc::new(ProviderRegistry::new()),
//! );
//!
//! let first = streamer.get_or_create("routes", OptionSet::new()).unwrap();
//! let second = streamer.get_or_create("routes", OptionSet::new()).unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! assert!(streamer.deactivate("routes"));
//! assert!(!streamer.deactivate("routes"));
//! ```

pub(crate) mod subscription_lifecycle;
