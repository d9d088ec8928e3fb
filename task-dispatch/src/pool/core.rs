use super::builder::PoolBuilder;
use super::context::WorkerId;
use super::injector::Injector;
use super::worker::Worker;
use crate::error::{DispatchError, Result};
use crate::request::BoundTask;
use crate::task::{Closure, Job, TaskCell, TaskHandle};

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

/// Source of pool ids, unique within the process.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// A fixed-size pool of worker threads draining a shared queue.
///
/// `WorkerPool` is responsible for:
/// - spawning its worker threads,
/// - accepting submissions without blocking,
/// - handing each job to exactly one worker,
/// - draining queued work and joining its workers on shutdown.
///
/// The pool is `Send + Sync`; share it by reference or behind an `Arc` to
/// submit from several threads at once. Dropping the pool shuts it down and
/// blocks until every queued job has run and every worker has exited.
pub struct WorkerPool {
    /// Process-unique id, reported in logs and by [`WorkerId::pool`].
    id: u64,

    /// Queue shared by all workers.
    injector: Arc<Injector>,

    /// Join handles for worker threads. Empty once the pool is closed.
    handles: Vec<JoinHandle<()>>,

    /// Number given to the next submitted task.
    next_task: AtomicU64,
}

impl WorkerPool {
    /// Returns a builder for configuring a new pool.
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Creates a pool with `worker_threads` workers and default settings.
    ///
    /// # Panics
    ///
    /// Panics if `worker_threads == 0`.
    pub fn new(worker_threads: usize) -> Result<Self> {
        PoolBuilder::new().worker_threads(worker_threads).build()
    }

    /// Spawns the workers described by `config`.
    pub(crate) fn start(config: PoolBuilder) -> Result<Self> {
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);

        let mut pool = Self {
            id,
            injector: Arc::new(Injector::new()),
            handles: Vec::with_capacity(config.worker_threads),
            next_task: AtomicU64::new(0),
        };

        for index in 0..config.worker_threads {
            let worker = Worker::new(WorkerId::new(id, index), pool.injector.clone());
            let on_start = config.on_thread_start.clone();
            let on_stop = config.on_thread_stop.clone();

            // On failure `pool` is dropped, which joins the workers already spawned.
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index))
                .spawn(move || {
                    run_hook(on_start.as_deref(), "on_thread_start");

                    worker.run();

                    run_hook(on_stop.as_deref(), "on_thread_stop");
                })
                .map_err(DispatchError::Spawn)?;

            pool.handles.push(handle);
        }

        debug!(pool = id, workers = config.worker_threads, "worker pool started");

        Ok(pool)
    }

    /// Returns the process-unique id of this pool.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the number of worker threads.
    pub fn worker_threads(&self) -> usize {
        self.handles.len()
    }

    /// Returns the number of submitted jobs no worker has picked up yet.
    pub fn queued(&self) -> usize {
        self.injector.len()
    }

    /// Submits a bound task and returns a handle to it.
    ///
    /// Submission only enqueues: it never blocks and never fails because the
    /// workers are busy.
    pub fn submit<T>(&self, task: BoundTask<T>) -> TaskHandle<T>
    where
        T: Send + 'static,
    {
        let id = self.next_task.fetch_add(1, Ordering::Relaxed);
        let cell = Arc::new(TaskCell::new(id, task.label_arc()));

        trace!(pool = self.id, task = id, label = ?task.label(), "task submitted");

        self.injector.push(Box::new(Job::new(task, cell.clone())));

        TaskHandle::new(cell)
    }

    /// Runs `f` on a worker without tracking its completion.
    ///
    /// A panic inside `f` is caught and logged.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(Closure(f)));
    }

    /// Shuts the pool down.
    ///
    /// Queued jobs still run; the call returns once every worker has exited.
    /// Dropping the pool has the same effect.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.handles.is_empty() {
            return;
        }

        self.injector.shutdown();

        for handle in self.handles.drain(..) {
            if let Err(payload) = handle.join() {
                let err = DispatchError::from_panic(&*payload);
                warn!(pool = self.id, error = %err, "worker thread panicked");
            }
        }

        debug!(pool = self.id, "worker pool stopped");
    }
}

/// Runs a thread hook, if any.
///
/// A panicking hook is logged and otherwise ignored, so the worker still
/// enters its loop and queued jobs are never left without a thread.
fn run_hook(hook: Option<&(dyn Fn() + Send + Sync)>, name: &'static str) {
    let Some(hook) = hook else {
        return;
    };

    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(hook)) {
        let err = DispatchError::from_panic(&*payload);
        warn!(hook = name, error = %err, "thread hook panicked");
    }
}

impl Drop for WorkerPool {
    /// Shuts down the pool.
    ///
    /// This performs the following steps:
    /// 1. Signals the injector so parked workers wake up
    /// 2. Lets workers drain the remaining queue
    /// 3. Joins all worker threads
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("id", &self.id)
            .field("worker_threads", &self.handles.len())
            .field("queued", &self.queued())
            .finish()
    }
}
