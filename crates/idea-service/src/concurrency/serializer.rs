//! Per-key task serializer
//!
//! Tasks are submitted against a key (an idea's message id) as either
//! *shared* or *exclusive*:
//!
//! - shared tasks for a key may overlap each other
//! - an exclusive task starts only once every task submitted before it for
//!   the same key has finished, and tasks submitted after it wait for it
//! - tasks for different keys never wait on each other
//!
//! Each active key owns a FIFO queue drained by its own runner task. The
//! registry counts tasks admitted but not yet finished per key; the key's
//! queue is dropped as soon as that count reaches zero, which ends the runner.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Why a serialized task produced no value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializerError {
    #[error("Serialized task panicked: {0}")]
    Panicked(String),

    #[error("Serializer queue closed before the task completed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Shared,
    Exclusive,
}

struct Submission {
    mode: Mode,
    job: BoxFuture<'static, ()>,
}

struct Queue {
    tx: mpsc::UnboundedSender<Submission>,
    /// Tasks admitted to this queue that have not finished yet
    pending: usize,
}

struct Registry<K> {
    queues: Mutex<HashMap<K, Queue>>,
}

impl<K> Registry<K>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    /// Admit a task, creating the key's queue and runner if needed
    fn acquire(self: &Arc<Self>, key: &K, submission: Submission) {
        let mut queues = self.queues.lock();
        let queue = queues.entry(key.clone()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(run_queue(rx));
            debug!(key = ?key, "Serializer queue created");
            Queue { tx, pending: 0 }
        });

        // The runner only stops once the sender is dropped, which happens
        // under this lock, so sending cannot fail here.
        if queue.tx.send(submission).is_ok() {
            queue.pending += 1;
        } else {
            warn!(key = ?key, "Serializer queue closed unexpectedly");
        }
    }

    /// Mark one task of `key` as finished, dropping the queue when idle
    fn release(&self, key: &K) {
        let mut queues = self.queues.lock();
        if let Entry::Occupied(mut entry) = queues.entry(key.clone()) {
            let queue = entry.get_mut();
            queue.pending = queue.pending.saturating_sub(1);
            if queue.pending == 0 {
                entry.remove();
                debug!(key = ?key, "Serializer queue released");
            }
        }
    }
}

/// Drain one key's queue
async fn run_queue(mut rx: mpsc::UnboundedReceiver<Submission>) {
    let mut shared = JoinSet::new();

    while let Some(Submission { mode, job }) = rx.recv().await {
        match mode {
            Mode::Shared => {
                shared.spawn(job);
            }
            Mode::Exclusive => {
                while shared.join_next().await.is_some() {}
                job.await;
            }
        }

        // reap finished shared tasks so the set stays small
        while shared.try_join_next().is_some() {}
    }
}

/// Handle for the result of a submitted task
///
/// Dropping the ticket does not cancel the task.
#[must_use = "the task runs regardless, but its result is lost"]
pub struct Ticket<T>(oneshot::Receiver<Result<T, SerializerError>>);

impl<T> Future for Ticket<T> {
    type Output = Result<T, SerializerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(SerializerError::Closed)))
    }
}

/// Per-key serializer of shared and exclusive tasks
pub struct Serializer<K> {
    registry: Arc<Registry<K>>,
}

impl<K> Clone for Serializer<K> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<K> Default for Serializer<K>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Serializer<K>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                queues: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Queue a task that may overlap other shared tasks of the same key
    ///
    /// Must be called within a Tokio runtime.
    pub fn submit_shared<F, T>(&self, key: K, task: F) -> Ticket<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.submit(key, Mode::Shared, task)
    }

    /// Queue a task that runs alone with respect to its key
    ///
    /// Must be called within a Tokio runtime.
    pub fn submit_exclusive<F, T>(&self, key: K, task: F) -> Ticket<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.submit(key, Mode::Exclusive, task)
    }

    /// Run a shared task and wait for its result
    pub async fn run_shared<F, T>(&self, key: K, task: F) -> Result<T, SerializerError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.submit_shared(key, task).await
    }

    /// Run an exclusive task and wait for its result
    pub async fn run_exclusive<F, T>(&self, key: K, task: F) -> Result<T, SerializerError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.submit_exclusive(key, task).await
    }

    /// Number of keys with admitted, unfinished tasks
    pub fn active_keys(&self) -> usize {
        self.registry.queues.lock().len()
    }

    fn submit<F, T>(&self, key: K, mode: Mode, task: F) -> Ticket<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let registry = Arc::clone(&self.registry);
        let job_key = key.clone();

        let job = async move {
            let result = AssertUnwindSafe(task)
                .catch_unwind()
                .await
                .map_err(|panic| SerializerError::Panicked(panic_message(panic.as_ref())));

            // released before reporting, so a caller that saw the result
            // also sees the bookkeeping for it
            registry.release(&job_key);
            let _ = done_tx.send(result);
        }
        .boxed();

        self.registry.acquire(&key, Submission { mode, job });
        Ticket(done_rx)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
