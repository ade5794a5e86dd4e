//! Single-lane task queue
//!
//! At most one queued task runs at a time and tasks run in the order they
//! were enqueued. A task starts only after the previous one has finished,
//! whether it succeeded or failed.

use std::future::Future;

use tokio::sync::Mutex;

/// Serialized task executor.
#[derive(Default)]
pub struct SyncQueue {
    // tokio's mutex hands out the lock to waiters in FIFO order
    lane: Mutex<()>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for every earlier task to finish, then run `task` to completion.
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let _turn = self.lane.lock().await;
        task.await
    }

    /// True while a task holds the lane.
    #[cfg(test)]
    fn is_busy(&self) -> bool {
        self.lane.try_lock().is_err()
    }
}
