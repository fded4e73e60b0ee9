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

//! Snapshot-provider boundary.
//!
//! A snapshot provider ("console") turns an [`OptionSet`] into a JSON document
//! describing some piece of in-process state. Providers are found by key through a
//! [`ProviderLookup`]; a missing provider is not an error, it simply yields the
//! empty snapshot.
//!
//! ```
//! use console_streamer::{FnProvider, OptionSet, ProviderLookup, ProviderRegistry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let providers = ProviderRegistry::new();
//! providers.register(Arc::new(FnProvider::new("routes", |options: &OptionSet| {
//!     Ok(Some(json!({ "filter": options.get("filter") })))
//! })));
//!
//! assert!(providers.lookup("routes").is_some());
//! assert!(providers.lookup("missing").is_none());
//! ```

pub(crate) mod invocation;
pub(crate) mod registry;

pub use registry::ProviderRegistry;

use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Parameters handed to every snapshot call.
pub type OptionSet = HashMap<String, Value>;

/// Canonical text published when a snapshot has no content or failed.
pub const EMPTY_SNAPSHOT: &str = "{}";

#[derive(Debug)]
pub enum SnapshotError {
    /// The provider reported a failure.
    Failed(String),
    /// The provider panicked; the payload message is kept when it is a string.
    Panicked(String),
    /// The provider's document could not be rendered as JSON text.
    Serialize(serde_json::Error),
}

impl SnapshotError {
    pub fn failed(message: impl Into<String>) -> Self {
        SnapshotError::Failed(message.into())
    }
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Failed(message) => write!(f, "snapshot provider failed: {message}"),
            SnapshotError::Panicked(message) => {
                write!(f, "snapshot provider panicked: {message}")
            }
            SnapshotError::Serialize(err) => {
                write!(f, "unable to serialize snapshot: {err}")
            }
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SnapshotError::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

/// Produces a structured snapshot for one key.
///
/// Implementations are called synchronously from ticker threads and from caller
/// threads, possibly at the same time.
pub trait SnapshotProvider: Send + Sync {
    fn id(&self) -> &str;

    /// `Ok(None)` and `Ok(Some(Value::Null))` both mean "nothing to report".
    fn snapshot(&self, options: &OptionSet) -> Result<Option<Value>, SnapshotError>;
}

/// Resolves a subscription key to a provider at call time.
pub trait ProviderLookup: Send + Sync {
    fn lookup(&self, key: &str) -> Option<Arc<dyn SnapshotProvider>>;
}

/// Adapts a closure into a [`SnapshotProvider`].
pub struct FnProvider<F> {
    id: String,
    snapshot_fn: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&OptionSet) -> Result<Option<Value>, SnapshotError> + Send + Sync + 'static,
{
    pub fn new(id: impl Into<String>, snapshot_fn: F) -> Self {
        Self {
            id: id.into(),
            snapshot_fn,
        }
    }
}

impl<F> SnapshotProvider for FnProvider<F>
where
    F: Fn(&OptionSet) -> Result<Option<Value>, SnapshotError> + Send + Sync + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn snapshot(&self, options: &OptionSet) -> Result<Option<Value>, SnapshotError> {
        (self.snapshot_fn)(options)
    }
}

#[cfg(test)]
mod tests {
    use super::{FnProvider, OptionSet, SnapshotError, SnapshotProvider};
    use serde_json::json;
    use std::error::Error;

    #[test]
    fn fn_provider_forwards_options_to_closure() {
        let provider = FnProvider::new("echo", |options: &OptionSet| {
            Ok(Some(json!({ "size": options.len() })))
        });
        let mut options = OptionSet::new();
        options.insert("a".to_string(), json!("1"));

        assert_eq!(provider.id(), "echo");
        assert_eq!(
            provider.snapshot(&options).expect("echo succeeds"),
            Some(json!({ "size": 1 }))
        );
    }

    #[test]
    fn snapshot_error_display_names_the_failure() {
        let err = SnapshotError::failed("backend offline");
        assert_eq!(err.to_string(), "snapshot provider failed: backend offline");
        assert!(err.source().is_none());

        let serialize_err = serde_json::from_str::<serde_json::Value>("{")
            .expect_err("truncated document should not parse");
        assert!(SnapshotError::Serialize(serialize_err).source().is_some());
    }
}
