//! Fixed-size worker pool for asynchronous dispatch.
//!
//! ```text
//! post(parallel event)
//!     │
//!     └──► [shared queue] ──► worker 0 ──► holder 1, holder 2, ... (in order)
//!          (policy)      ├──► worker 1
//!                        └──► worker N-1
//! ```
//!
//! ## Rules
//! - **One task per event**: every handler of one event runs on the same worker
//! - **No cross-event ordering**: two tasks may finish in either order
//! - **Overflow**: decided by [`QueuePolicy`]
//! - **Shutdown**: queued tasks are drained before workers exit

use crate::config::{BusConfig, QueuePolicy};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use kairo_core::DispatchError;
use parking_lot::Mutex;
use std::thread::{self, JoinHandle, ThreadId};

/// A unit of work for a worker.
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

/// Long-lived worker threads fed by one shared queue.
///
/// Workers exit once every sender is gone and the queue is drained; there is
/// no in-band stop message.
pub(crate) struct WorkerPool {
    // `None` once shut down.
    sender: Mutex<Option<Sender<Task>>>,
    policy: QueuePolicy,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_ids: Vec<ThreadId>,
}

impl WorkerPool {
    /// Spawn `config.workers` threads.
    ///
    /// Threads that fail to spawn are logged and skipped; a pool without any
    /// thread refuses every submission.
    pub(crate) fn start(config: &BusConfig) -> Self {
        let (sender, receiver) = match config.queue.capacity() {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };

        let mut workers = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let receiver = receiver.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index))
                .spawn(move || work(receiver));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(error) => {
                    tracing::error!(index, %error, "failed to spawn event bus worker");
                }
            }
        }
        let worker_ids = workers.iter().map(|handle| handle.thread().id()).collect();

        tracing::debug!(
            workers = workers.len(),
            policy = ?config.queue,
            "event bus worker pool started"
        );

        Self {
            sender: Mutex::new((!workers.is_empty()).then_some(sender)),
            policy: config.queue,
            workers: Mutex::new(workers),
            worker_ids,
        }
    }

    /// A pool without workers that refuses every submission.
    pub(crate) fn stopped() -> Self {
        Self {
            sender: Mutex::new(None),
            policy: QueuePolicy::Unbounded,
            workers: Mutex::new(Vec::new()),
            worker_ids: Vec::new(),
        }
    }

    /// Queue a task according to the pool's policy.
    ///
    /// A task is either queued, and then run before the workers exit, or
    /// refused with an error. With [`QueuePolicy::Block`], a worker
    /// submitting into its own full queue waits until another worker frees a
    /// slot.
    pub(crate) fn submit(&self, task: Task) -> Result<(), DispatchError> {
        // The lock is released before sending so a blocked send never holds
        // up `shutdown`.
        let sender = self
            .sender
            .lock()
            .clone()
            .ok_or(DispatchError::Shutdown)?;

        match self.policy {
            QueuePolicy::Unbounded => sender.send(task).map_err(|_| DispatchError::Shutdown),
            QueuePolicy::Block { .. } => {
                if sender.is_full() && self.is_worker() {
                    tracing::warn!("worker is waiting on its own full queue");
                }
                sender.send(task).map_err(|_| DispatchError::Shutdown)
            }
            QueuePolicy::Reject { .. } => sender.try_send(task).map_err(|error| match error {
                TrySendError::Full(_) => DispatchError::Rejected,
                TrySendError::Disconnected(_) => DispatchError::Shutdown,
            }),
        }
    }

    /// Number of worker threads the pool started with.
    pub(crate) fn size(&self) -> usize {
        self.worker_ids.len()
    }

    /// Stop accepting tasks, drain the queue and join the workers.
    ///
    /// Idempotent. Concurrent callers all return after the workers have
    /// exited. When called from one of the pool's own workers, the queue is
    /// closed but nothing is joined; the workers exit on their own once it is
    /// drained.
    pub(crate) fn shutdown(&self) {
        let closed = self.sender.lock().take().is_some();
        if closed {
            tracing::debug!("event bus worker pool closed");
        }
        if self.is_worker() {
            return;
        }

        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return;
        }
        for handle in workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("event bus worker exited abnormally");
            }
        }
        tracing::debug!("event bus worker pool stopped");
    }

    /// Check if the calling thread is one of this pool's workers.
    pub(crate) fn is_worker(&self) -> bool {
        self.worker_ids.contains(&thread::current().id())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn work(receiver: Receiver<Task>) {
    // Ends once the queue is disconnected and empty. Tasks contain their own
    // failures; see `dispatch::run`.
    for task in receiver.iter() {
        task();
    }
}
