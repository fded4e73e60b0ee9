//! Built-in consoles served by the binary.

use console_streamer::{FnProvider, OptionSet, ProviderRegistry, SnapshotError};
use lazy_static::lazy_static;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

pub const RUNTIME_CONSOLE: &str = "runtime";
pub const ECHO_CONSOLE: &str = "echo";
pub const ENVIRONMENT_CONSOLE: &str = "environment";

lazy_static! {
    static ref PROCESS_START: Instant = Instant::now();
}

/// Pins the uptime origin; call once at startup.
pub fn mark_process_start() {
    lazy_static::initialize(&PROCESS_START);
}

pub fn builtin_providers() -> ProviderRegistry {
    let providers = ProviderRegistry::new();
    providers.register(Arc::new(FnProvider::new(RUNTIME_CONSOLE, runtime_snapshot)));
    providers.register(Arc::new(FnProvider::new(ECHO_CONSOLE, |options: &OptionSet| {
        Ok(Some(json!(options)))
    })));
    providers.register(Arc::new(FnProvider::new(
        ENVIRONMENT_CONSOLE,
        environment_snapshot,
    )));
    providers
}

fn runtime_snapshot(_options: &OptionSet) -> Result<Option<Value>, SnapshotError> {
    let uptime_ms = u64::try_from(PROCESS_START.elapsed().as_millis()).unwrap_or(u64::MAX);
    let parallelism = thread::available_parallelism()
        .map(usize::from)
        .map_err(|err| SnapshotError::failed(err.to_string()))?;

    Ok(Some(json!({
        "pid": std::process::id(),
        "uptime_ms": uptime_ms,
        "available_parallelism": parallelism,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Environment variables, optionally narrowed by a `prefix` option.
fn environment_snapshot(options: &OptionSet) -> Result<Option<Value>, SnapshotError> {
    let prefix = match options.get("prefix") {
        None => "",
        Some(Value::String(prefix)) => prefix.as_str(),
        Some(other) => {
            return Err(SnapshotError::failed(format!(
                "prefix must be a string, got {other}"
            )))
        }
    };

    let variables: serde_json::Map<String, Value> = env::vars()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    if variables.is_empty() {
        return Ok(None);
    }
    Ok(Some(Value::Object(variables)))
}
