//! # task-dispatch
//!
//! **task-dispatch** submits batches of independent units of work to a bounded
//! pool of worker threads and waits for them under one of two disciplines:
//! wait for everything and collect, or consume results as they complete.
//!
//! A unit of work is described by a [`TaskRequest`]: a shareable [`Callable`]
//! plus the positional and named arguments it will be called with. Requests
//! are bound into zero-argument thunks, submitted to a [`WorkerPool`], and
//! observed through [`TaskHandle`]s. Failures are captured on the handle and
//! re-surfaced only when that handle's result is read.
//!
//! The crate offers:
//!
//! - [`run_to_completion`] to run a batch and collect every result, on either
//!   an ephemeral pool of [`DEFAULT_CONCURRENCY`] workers or a caller-owned
//!   pool
//! - [`submit_only`] to submit now and join later
//! - [`await_handles`] and [`await_results`] as barriers over handle lists
//! - [`as_completed`] to consume handles in completion order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use task_dispatch::{Arguments, BoxError, Callable, WorkerPool, request, run_to_completion};
//!
//! fn add(mut args: Arguments) -> Result<i32, BoxError> {
//!     let a: i32 = args.take(0)?;
//!     let b: i32 = args.take(1)?;
//!     Ok(a + b)
//! }
//!
//! let add = Callable::new(add).with_name("add");
//! let pool = WorkerPool::new(4)?;
//!
//! // Caller-owned pool: results in request order.
//! let sums = run_to_completion(vec![request!(add, 1, 2), request!(add, 3, 4)], Some(&pool))?;
//! assert_eq!(sums, vec![3, 7]);
//!
//! // Ephemeral pool: results in completion order.
//! let mut sums = run_to_completion(vec![request!(add, 1, 2), request!(add, 3, 4)], None)?;
//! sums.sort();
//! ```
//!
//! ## Modules
//!
//! - [`request`] — Work descriptors, argument bundles, and binding
//! - [`task`] — Task handles, status, and completion-order iteration
//! - [`pool`] — The worker pool and its builder

mod dispatch;
mod error;
mod macros;

pub mod pool;
pub mod request;
pub mod task;

pub use dispatch::{
    DEFAULT_CONCURRENCY, Dispatcher, await_handles, await_results, run_to_completion, submit_only,
};
pub use error::{BindingError, BoxError, DispatchError, Result};
pub use pool::{PoolBuilder, WorkerId, WorkerPool, current_worker};
pub use request::{Arguments, BoundTask, Callable, TaskRequest, bind};
pub use task::{AsCompleted, TaskHandle, TaskStatus, as_completed};
