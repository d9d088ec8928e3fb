use super::context::{WorkerId, enter_worker};
use super::injector::Injector;

use std::sync::Arc;

use tracing::debug;

/// A worker thread of a pool.
///
/// Workers pull jobs from the shared injector in submission order and run
/// them one at a time. A worker parks while the queue is empty and exits once
/// the pool shuts down and the queue is drained.
pub(crate) struct Worker {
    /// Identity of the worker, installed as thread-local context.
    id: WorkerId,

    /// Handle to the pool's shared queue.
    injector: Arc<Injector>,
}

impl Worker {
    /// Creates a new worker.
    pub(crate) fn new(id: WorkerId, injector: Arc<Injector>) -> Self {
        Self { id, injector }
    }

    /// Runs the worker loop until the pool shuts down.
    pub(crate) fn run(&self) {
        enter_worker(self.id, || {
            debug!(pool = self.id.pool(), worker = self.id.index(), "worker started");

            let mut executed = 0usize;
            while let Some(job) = self.injector.pop() {
                job.run();
                executed += 1;
            }

            debug!(
                pool = self.id.pool(),
                worker = self.id.index(),
                executed,
                "worker stopped"
            );
        });
    }
}
