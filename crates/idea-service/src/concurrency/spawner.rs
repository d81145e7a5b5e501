//! Task spawner
//!
//! Fire-and-forget work (closing an idea when its deadline fires, deleting
//! a notice after its lifetime) goes through a [`TaskSpawner`] instead of
//! calling `tokio::spawn` directly, so tests can hold the work back and run
//! it in a known order.

use futures::future::BoxFuture;
use parking_lot::Mutex;

/// Runs detached background tasks
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Spawns tasks on the current Tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

/// Spawner that queues tasks until [`ManualSpawner::run_pending`] is called
///
/// Tasks run one after another in the order they were spawned.
#[derive(Default)]
pub struct ManualSpawner {
    tasks: Mutex<Vec<BoxFuture<'static, ()>>>,
}

impl ManualSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run every queued task to completion, returning how many ran
    ///
    /// Tasks spawned while these run stay queued for the next call.
    pub async fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        let count = tasks.len();
        for task in tasks {
            task.await;
        }
        count
    }
}

impl TaskSpawner for ManualSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.tasks.lock().push(task);
    }
}

impl std::fmt::Debug for ManualSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSpawner")
            .field("pending", &self.pending())
            .finish()
    }
}
