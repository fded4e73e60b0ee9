//! Runtime helper for spawning subscription tick loops.

use crate::observability::events;
use std::future::Future;
use std::io;
use std::thread;
use tokio::runtime::Builder;
use tracing::{debug, warn};

pub(crate) const DEFAULT_TICK_RUNTIME_THREAD_NAME: &str = "console-ticker";

const COMPONENT: &str = "tick_runtime";

/// Owns the thread that drives one tick loop.
pub(crate) struct TickLoopHandle {
    worker_thread: String,
    join_handle: thread::JoinHandle<()>,
}

impl TickLoopHandle {
    pub(crate) fn worker_thread(&self) -> &str {
        &self.worker_thread
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

/// Starts `run_loop` on a dedicated named thread with its own current-thread
/// runtime.
///
/// The runtime is built on the calling thread and moved into the new one, so
/// build and spawn failures are both reported to the caller without waiting on
/// the new thread.
pub(crate) fn spawn_tick_loop<F, Fut>(thread_name: String, run_loop: F) -> io::Result<TickLoopHandle>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    debug!(
        event = events::RUNTIME_SPAWN_START,
        component = COMPONENT,
        worker_thread = thread_name.as_str(),
        "spawning tick runtime"
    );

    let runtime = Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| {
            warn!(
                event = events::RUNTIME_BUILD_FAILED,
                component = COMPONENT,
                worker_thread = thread_name.as_str(),
                err = %err,
                "unable to build tick runtime"
            );
            err
        })?;

    let join_handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || runtime.block_on(run_loop()))
        .map_err(|err| {
            warn!(
                event = events::RUNTIME_SPAWN_FAILED,
                component = COMPONENT,
                worker_thread = thread_name.as_str(),
                err = %err,
                "unable to spawn tick runtime thread"
            );
            err
        })?;

    debug!(
        event = events::RUNTIME_SPAWN_OK,
        component = COMPONENT,
        worker_thread = thread_name.as_str(),
        "tick runtime spawned"
    );

    Ok(TickLoopHandle {
        worker_thread: thread_name,
        join_handle,
    })
}
