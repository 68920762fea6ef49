//! Worker Pool
//!
//! Fixed-size set of long-lived executor threads fed from a shared queue.
//!
//! ## Lifetime
//! The global pool is created on first use and never torn down. Its threads
//! are reclaimed at process exit; in-flight tasks are not drained if the
//! process terminates early.

use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use std::thread;

use crossbeam::channel::{self, Receiver, SendError, Sender};

use crate::config::DEFAULT_POOL_WORKERS;
use crate::error::{NpyError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool of executor threads
pub struct WorkerPool {
    sender: Sender<Job>,
    workers: usize,
}

/// Handle to a submitted task; resolves to the task's return value
pub struct TaskHandle<T> {
    receiver: Receiver<thread::Result<T>>,
}

impl WorkerPool {
    /// Spawn a pool with `workers` threads.
    ///
    /// Threads that fail to spawn are skipped; with no threads at all, tasks
    /// run inline on the submitting thread.
    pub fn new(workers: usize) -> Self {
        let (sender, receiver) = channel::unbounded::<Job>();

        let mut spawned = 0;
        for id in 0..workers {
            let receiver = receiver.clone();
            let result = thread::Builder::new()
                .name(format!("npyio-worker-{}", id))
                .spawn(move || {
                    for job in receiver.iter() {
                        job();
                    }
                });

            match result {
                Ok(_) => spawned += 1,
                Err(e) => tracing::error!("Failed to spawn worker {}: {}", id, e),
            }
        }

        Self {
            sender,
            workers: spawned,
        }
    }

    /// The process-wide pool shared by every file reader
    pub fn global() -> &'static WorkerPool {
        static POOL: OnceLock<WorkerPool> = OnceLock::new();
        POOL.get_or_init(|| {
            let pool = WorkerPool::new(DEFAULT_POOL_WORKERS);
            tracing::info!("Started global worker pool with {} workers", pool.worker_count());
            pool
        })
    }

    /// Number of running worker threads
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Queue `task` for execution
    pub fn submit<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task));
            // The handle may have been dropped; nothing to report then
            let _ = tx.send(outcome);
        });

        if self.workers == 0 {
            job();
        } else if let Err(SendError(job)) = self.sender.send(job) {
            job();
        }

        TaskHandle { receiver: rx }
    }
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes
    pub fn join(self) -> Result<T> {
        match self.receiver.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(NpyError::Pool("task panicked".to_string())),
            Err(_) => Err(NpyError::Pool("task was dropped before completing".to_string())),
        }
    }
}
