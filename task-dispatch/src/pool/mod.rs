//! Worker pool.
//!
//! A pool is a fixed set of worker threads pulling jobs from one shared,
//! unbounded queue. The dispatcher only ever enqueues into a pool and waits on
//! the handles it gets back; queue locking and worker wake-up are the pool's
//! own business.
//!
//! It is composed of:
//! - [`PoolBuilder`]: configuration and construction,
//! - the pool itself ([`WorkerPool`]) and its lifecycle,
//! - the shared injector queue and the worker loop,
//! - thread-local worker identity ([`current_worker`]).

mod builder;
mod context;
mod core;
mod injector;
mod worker;

#[doc(inline)]
pub use builder::PoolBuilder;

#[doc(inline)]
pub use context::{WorkerId, current_worker};

#[doc(inline)]
pub use self::core::WorkerPool;
