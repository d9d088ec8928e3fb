use super::WorkerPool;
use crate::error::Result;

use std::fmt;
use std::sync::Arc;
use std::thread;

/// Callback run on each worker thread as it starts or stops.
pub(crate) type ThreadHook = Arc<dyn Fn() + Send + Sync>;

/// Builder for configuring and creating a [`WorkerPool`].
///
/// `PoolBuilder` allows customizing pool parameters before the worker
/// threads are spawned. Builders are cheap to clone, which lets a
/// [`Dispatcher`](crate::Dispatcher) keep one as the recipe for its
/// ephemeral pools.
///
/// # Examples
///
/// ```rust,ignore
/// let pool = PoolBuilder::new()
///     .worker_threads(4)
///     .thread_name("loader")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct PoolBuilder {
    /// Number of worker threads in the pool.
    pub(crate) worker_threads: usize,

    /// Prefix of worker thread names; the worker index is appended.
    pub(crate) thread_name: String,

    pub(crate) on_thread_start: Option<ThreadHook>,

    pub(crate) on_thread_stop: Option<ThreadHook>,
}

impl PoolBuilder {
    /// Creates a new `PoolBuilder` with default configuration.
    ///
    /// By default, the number of worker threads is set to the number
    /// of available logical CPUs, falling back to `1` if unavailable.
    pub fn new() -> Self {
        let worker_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            worker_threads,
            thread_name: "task-dispatch-worker".to_string(),
            on_thread_start: None,
            on_thread_stop: None,
        }
    }

    /// Sets the number of worker threads used by the pool.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn worker_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "worker_threads must be > 0");

        self.worker_threads = n;
        self
    }

    /// Sets the prefix used to name worker threads.
    ///
    /// Worker `i` is named `"{prefix}-{i}"`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Registers a callback run on each worker thread before it takes work.
    pub fn on_thread_start<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_thread_start = Some(Arc::new(f));
        self
    }

    /// Registers a callback run on each worker thread after it leaves its
    /// loop, just before the thread exits.
    pub fn on_thread_stop<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_thread_stop = Some(Arc::new(f));
        self
    }

    /// Builds the pool, spawning all of its worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Spawn`](crate::DispatchError::Spawn) if a
    /// worker thread cannot be started. Workers spawned before the failure
    /// are shut down and joined.
    pub fn build(self) -> Result<WorkerPool> {
        WorkerPool::start(self)
    }
}

impl Default for PoolBuilder {
    /// Creates a default `PoolBuilder`.
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoolBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("worker_threads", &self.worker_threads)
            .field("thread_name", &self.thread_name)
            .field("on_thread_start", &self.on_thread_start.is_some())
            .field("on_thread_stop", &self.on_thread_stop.is_some())
            .finish()
    }
}
