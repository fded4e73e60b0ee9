//! Snapshot invocation adapter: provider lookup, failure absorption and rendering.

use crate::observability::{events, fields};
use crate::provider::{OptionSet, ProviderLookup, SnapshotError, EMPTY_SNAPSHOT};
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace};

const COMPONENT: &str = "snapshot_invocation";

/// Calls the provider registered for `key`.
///
/// `Ok(None)` covers both a missing provider and a provider with nothing to report.
pub(crate) fn try_snapshot(
    providers: &dyn ProviderLookup,
    key: &str,
    options: &OptionSet,
) -> Result<Option<String>, SnapshotError> {
    let Some(provider) = providers.lookup(key) else {
        trace!(
            event = events::SNAPSHOT_PROVIDER_MISSING,
            component = COMPONENT,
            key,
            "no provider registered for key"
        );
        return Ok(None);
    };

    let document = panic::catch_unwind(AssertUnwindSafe(|| provider.snapshot(options)))
        .map_err(|payload| SnapshotError::Panicked(panic_message(payload.as_ref())))??;

    match document {
        None | Some(Value::Null) => Ok(None),
        Some(document) => serde_json::to_string(&document)
            .map(Some)
            .map_err(SnapshotError::Serialize),
    }
}

/// Folds every outcome of [`try_snapshot`] into publishable text.
pub(crate) fn invoke_snapshot(
    providers: &dyn ProviderLookup,
    key: &str,
    options: &OptionSet,
) -> String {
    match try_snapshot(providers, key, options) {
        Ok(Some(json)) => {
            debug!(
                event = events::SNAPSHOT_OK,
                component = COMPONENT,
                key,
                payload = fields::payload_preview(&json),
                "snapshot produced"
            );
            json
        }
        Ok(None) => {
            trace!(
                event = events::SNAPSHOT_EMPTY,
                component = COMPONENT,
                key,
                "snapshot empty"
            );
            EMPTY_SNAPSHOT.to_string()
        }
        Err(err) => {
            debug!(
                event = events::SNAPSHOT_FAILED,
                component = COMPONENT,
                key,
                err = %err,
                "error calling snapshot provider"
            );
            EMPTY_SNAPSHOT.to_string()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        fields::NONE.to_string()
    }
}
