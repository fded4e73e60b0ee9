//! Canonical structured event names used across `console-streamer`.

// Registry lifecycle events.
pub const STREAMER_CREATE: &str = "streamer_create";
pub const SUBSCRIPTION_CREATE: &str = "subscription_create";
pub const SUBSCRIPTION_REUSE: &str = "subscription_reuse";
pub const SUBSCRIPTION_CREATE_FAILED: &str = "subscription_create_failed";
pub const SUBSCRIPTION_OPTIONS_UPDATE: &str = "subscription_options_update";
pub const SUBSCRIPTION_OPTIONS_UPDATE_MISSING: &str = "subscription_options_update_missing";
pub const SUBSCRIPTION_DEACTIVATE: &str = "subscription_deactivate";
pub const SUBSCRIPTION_DEACTIVATE_MISSING: &str = "subscription_deactivate_missing";
pub const SUBSCRIPTION_CANCEL: &str = "subscription_cancel";
pub const REGISTRY_SHUTDOWN: &str = "registry_shutdown";

// Snapshot invocation events.
pub const SNAPSHOT_OK: &str = "snapshot_ok";
pub const SNAPSHOT_EMPTY: &str = "snapshot_empty";
pub const SNAPSHOT_PROVIDER_MISSING: &str = "snapshot_provider_missing";
pub const SNAPSHOT_FAILED: &str = "snapshot_failed";

// Ticker and publish events.
pub const TICK_PUBLISH: &str = "tick_publish";
pub const TICK_NO_SUBSCRIBERS: &str = "tick_no_subscribers";
pub const TICK_DISCARDED_AFTER_CANCEL: &str = "tick_discarded_after_cancel";
pub const TICKER_START: &str = "ticker_start";
pub const TICKER_STOP: &str = "ticker_stop";
pub const STREAM_RECV_LAGGED: &str = "stream_recv_lagged";

// Provider registry events.
pub const PROVIDER_REGISTER: &str = "provider_register";
pub const PROVIDER_REPLACE: &str = "provider_replace";
pub const PROVIDER_UNREGISTER: &str = "provider_unregister";

// Runtime events.
pub const RUNTIME_SPAWN_START: &str = "runtime_spawn_start";
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_SPAWN_FAILED: &str = "runtime_spawn_failed";
pub const RUNTIME_BUILD_FAILED: &str = "runtime_build_failed";
