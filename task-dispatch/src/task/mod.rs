//! Task handles and completion tracking.
//!
//! This module defines how a submitted unit of work is represented while it
//! waits, runs, and finishes.
//!
//! It includes:
//! - the task state machine ([`TaskStatus`]),
//! - the shared completion cell written by the worker and read by the caller,
//! - [`TaskHandle`], the caller's view of a submitted task,
//! - [`as_completed`], which yields handles in the order their tasks finish.
//!
//! Handles are created by [`WorkerPool::submit`](crate::WorkerPool::submit)
//! and by the dispatch functions; the lower-level components are used
//! internally by the pool.

pub(crate) mod core;
pub(crate) mod state;

mod completed;
mod handle;

pub(crate) use self::core::{Closure, Job, Runnable, TaskCell};

#[doc(inline)]
pub use completed::{AsCompleted, as_completed};

#[doc(inline)]
pub use handle::TaskHandle;

#[doc(inline)]
pub use state::TaskStatus;
