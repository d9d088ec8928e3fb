use crate::task::Runnable;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

/// Shared job queue of a worker pool.
///
/// Every submission is pushed here and every worker pulls from here. The
/// queue is unbounded, so pushing never blocks and never fails because the
/// pool is busy.
///
/// It also coordinates worker parking and waking using a condition variable,
/// allowing workers to sleep while no work is available.
pub(crate) struct Injector {
    /// Jobs waiting for a worker, oldest first.
    queue: Mutex<VecDeque<Box<dyn Runnable>>>,

    /// Condition variable used to wake parked workers.
    condvar: Condvar,

    /// Indicates whether the pool is shutting down.
    shutdown: AtomicBool,
}

impl Injector {
    /// Creates a new empty injector.
    pub(crate) fn new() -> Self {
        Injector {
            queue: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Signals shutdown and wakes all parked workers.
    ///
    /// Jobs already queued are still handed out; workers exit once the queue
    /// is empty. The flag is set under the queue lock so a worker cannot
    /// check it and then park after the wake-up was sent.
    pub(crate) fn shutdown(&self) {
        let _queue = self.queue.lock().unwrap();
        self.shutdown.store(true, Ordering::Release);
        self.condvar.notify_all();
    }

    /// Pushes a job and wakes one parked worker.
    pub(crate) fn push(&self, job: Box<dyn Runnable>) {
        self.queue.lock().unwrap().push_back(job);
        self.condvar.notify_one();
    }

    /// Takes the oldest job, parking the calling worker while the queue is
    /// empty.
    ///
    /// Returns `None` once shutdown has been signalled and the queue is
    /// drained.
    pub(crate) fn pop(&self) -> Option<Box<dyn Runnable>> {
        let mut queue = self.queue.lock().unwrap();

        loop {
            if let Some(job) = queue.pop_front() {
                return Some(job);
            }

            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }

            queue = self.condvar.wait(queue).unwrap();
        }
    }

    /// Returns the number of jobs waiting for a worker.
    pub(crate) fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}
