use std::cell::Cell;

thread_local! {
    /// Identity of the pool worker running on this thread, if any.
    ///
    /// Set for the lifetime of a worker's run loop and cleared afterwards.
    pub(crate) static CURRENT_WORKER: Cell<Option<WorkerId>> = const { Cell::new(None) };
}

/// Identifies one worker thread of one [`WorkerPool`](crate::WorkerPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pool: u64,
    index: usize,
}

impl WorkerId {
    pub(crate) fn new(pool: u64, index: usize) -> Self {
        Self { pool, index }
    }

    /// Returns the id of the pool the worker belongs to.
    pub fn pool(&self) -> u64 {
        self.pool
    }

    /// Returns the worker's index within its pool, in `0..worker_threads`.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Returns the identity of the pool worker the current thread is, or `None`
/// when called from a thread that does not belong to a pool.
///
/// # Examples
///
/// ```rust,ignore
/// let on_worker = Callable::new(|_| Ok::<_, BoxError>(current_worker().is_some()));
/// ```
pub fn current_worker() -> Option<WorkerId> {
    CURRENT_WORKER.with(Cell::get)
}

/// Marks the current thread as worker `id` for the duration of `f`.
///
/// The previous value is restored afterwards.
pub(crate) fn enter_worker<R>(id: WorkerId, f: impl FnOnce() -> R) -> R {
    let prev = CURRENT_WORKER.with(|current| current.replace(Some(id)));

    let out = f();

    CURRENT_WORKER.with(|current| current.set(prev));

    out
}
