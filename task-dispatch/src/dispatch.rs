//! Batch dispatch over a worker pool.
//!
//! The functions here bind a list of [`TaskRequest`]s, submit them to a pool,
//! and either wait for them or hand back their [`TaskHandle`]s. They hold no
//! state between calls.
//!
//! # Result ordering
//!
//! [`run_to_completion`] orders its output differently depending on who owns
//! the pool:
//!
//! - with a caller-owned pool, result `i` belongs to request `i`;
//! - without one, results come back **in completion order**, so position `i`
//!   is whichever unit finished `i`-th, not request `i`.
//!
//! Callers that need positional correspondence must pass a pool, or use
//! [`submit_only`] followed by [`await_results`].

use crate::error::Result;
use crate::pool::{PoolBuilder, WorkerPool};
use crate::request::{BoundTask, TaskRequest, bind};
use crate::task::{TaskHandle, as_completed};

use tracing::debug;

/// Number of workers in the pool created by [`run_to_completion`] when the
/// caller does not supply one.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Dispatch configuration.
///
/// A `Dispatcher` only carries the recipe for the ephemeral pools it creates
/// when no pool is supplied; it keeps no state between calls.
///
/// # Examples
///
/// ```rust,ignore
/// let dispatcher = Dispatcher::new()
///     .with_ephemeral_pool(PoolBuilder::new().worker_threads(4));
///
/// let results = dispatcher.run_to_completion(requests, None)?;
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// Recipe for the pool built by a call that is not given one.
    ephemeral: PoolBuilder,
}

impl Dispatcher {
    /// Creates a dispatcher whose ephemeral pools have
    /// [`DEFAULT_CONCURRENCY`] workers.
    pub fn new() -> Self {
        Self {
            ephemeral: PoolBuilder::new()
                .worker_threads(DEFAULT_CONCURRENCY)
                .thread_name("task-dispatch-ephemeral"),
        }
    }

    /// Replaces the recipe used to build ephemeral pools.
    pub fn with_ephemeral_pool(mut self, builder: PoolBuilder) -> Self {
        self.ephemeral = builder;
        self
    }

    /// Returns the number of workers an ephemeral pool gets.
    pub fn ephemeral_workers(&self) -> usize {
        self.ephemeral.worker_threads
    }

    /// Runs every request and returns their results once all are done.
    ///
    /// With `Some(pool)`, the tasks are submitted to the caller's pool, the
    /// call waits until every one of them has finished, and the results are
    /// returned **in request order**. The pool keeps running afterwards.
    ///
    /// With `None`, a fresh pool is built from the ephemeral recipe, results
    /// are returned **in completion order**, and the pool is shut down and
    /// its workers joined before the call returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first failing unit met while collecting
    /// (request order with a pool, completion order without). Other units
    /// are not interrupted: they run to completion, and the ephemeral pool
    /// still waits for them before returning. Building the ephemeral pool
    /// can fail with [`DispatchError::Spawn`](crate::DispatchError::Spawn).
    pub fn run_to_completion<T, I>(
        &self,
        requests: I,
        pool: Option<&WorkerPool>,
    ) -> Result<Vec<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = TaskRequest<T>>,
    {
        let tasks = bind(requests);

        match pool {
            Some(pool) => {
                debug!(pool = pool.id(), tasks = tasks.len(), "dispatching batch on caller pool");

                let handles = submit_bound(pool, tasks);
                await_handles(&handles);

                handles.into_iter().map(TaskHandle::join).collect()
            }
            None => {
                let pool = self.ephemeral.clone().build()?;
                debug!(
                    pool = pool.id(),
                    tasks = tasks.len(),
                    "dispatching batch on ephemeral pool"
                );

                let handles = submit_bound(&pool, tasks);

                // Collection stops at the first failure; the drop below still
                // waits for the remaining units and joins every worker.
                let results: Result<Vec<T>> =
                    as_completed(handles).map(TaskHandle::join).collect();
                drop(pool);

                results
            }
        }
    }
}

impl Default for Dispatcher {
    /// Returns [`Dispatcher::new`].
    fn default() -> Self {
        Self::new()
    }
}

/// Runs every request with the default [`Dispatcher`].
///
/// See [`Dispatcher::run_to_completion`]. Without a pool, results are in
/// completion order, not request order.
pub fn run_to_completion<T, I>(requests: I, pool: Option<&WorkerPool>) -> Result<Vec<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = TaskRequest<T>>,
{
    Dispatcher::new().run_to_completion(requests, pool)
}

/// Submits every request to `pool` and returns their handles immediately.
///
/// Handle `i` belongs to request `i`. Nothing blocks; join the handles later
/// with [`await_handles`], [`await_results`], or [`as_completed`].
pub fn submit_only<T, I>(pool: &WorkerPool, requests: I) -> Vec<TaskHandle<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = TaskRequest<T>>,
{
    submit_bound(pool, bind(requests))
}

/// Blocks until every handle has finished, successfully or not.
///
/// This is a barrier only; outcomes stay in the handles.
pub fn await_handles<T>(handles: &[TaskHandle<T>]) {
    for handle in handles {
        handle.wait();
    }
}

/// Blocks until every handle has finished and returns their outcomes.
///
/// Outcome `i` belongs to handle `i`, whatever order the tasks finished in.
/// A failed task's captured error sits at its own position and does not
/// affect the others.
pub fn await_results<T>(handles: Vec<TaskHandle<T>>) -> Vec<Result<T>> {
    await_handles(&handles);

    handles.into_iter().map(TaskHandle::join).collect()
}

fn submit_bound<T>(pool: &WorkerPool, tasks: Vec<BoundTask<T>>) -> Vec<TaskHandle<T>>
where
    T: Send + 'static,
{
    tasks.into_iter().map(|task| pool.submit(task)).collect()
}
