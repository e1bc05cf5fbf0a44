//! Background task execution for foreground-driven callers.
//!
//! Every asynchronous operation in moviedeck (searches, detail fetches,
//! sorts, favorites I/O) is spawned through a [`Background`] handle instead of
//! being detached. The handle pairs a Tokio runtime [`Handle`] with a
//! [`TaskTracker`], so callers that are not themselves async (a render loop,
//! for instance) can start work, and the owner can wait for every spawned task
//! at teardown.

use std::future::Future;

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

/// Spawner for the fire-and-forget operations of the core.
///
/// Cloning is cheap; clones share the same tracker, so [`drain`](Self::drain)
/// on any clone waits for tasks spawned through all of them. Use
/// [`scoped`](Self::scoped) for an independent tracker on the same runtime.
#[derive(Debug, Clone)]
pub struct Background {
    handle: Handle,
    tracker: TaskTracker,
}

impl Background {
    /// Spawn onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn onto the runtime the caller is currently running in.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime context.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// A spawner on the same runtime with its own, independent tracker.
    pub fn scoped(&self) -> Self {
        Self::new(self.handle.clone())
    }

    /// Spawn an async task. Never blocks the caller.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn_on(task, &self.handle);
    }

    /// Spawn CPU-bound or lock-heavy work on the blocking pool.
    pub fn spawn_blocking<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tracker.spawn_blocking_on(task, &self.handle);
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every task spawned so far (and any task they spawn through
    /// this tracker before finishing) has completed.
    ///
    /// The tracker accepts new tasks again once this returns.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
