use super::core::TaskCell;
use super::state::TaskStatus;
use crate::error::Result;

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Sender;

/// A handle to a task submitted to a [`WorkerPool`](crate::WorkerPool).
///
/// The handle observes the task's lifecycle and, once the task is terminal,
/// gives access to its outcome. A failure captured while the task ran is
/// returned by [`join`](Self::join), never raised on the worker.
///
/// Dropping a `TaskHandle` does **not** cancel the task; it only discards
/// the ability to observe its result.
pub struct TaskHandle<T> {
    pub(crate) cell: Arc<TaskCell<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(cell: Arc<TaskCell<T>>) -> Self {
        Self { cell }
    }

    /// Returns the task number assigned by the pool at submission.
    pub fn id(&self) -> u64 {
        self.cell.id
    }

    /// Returns the label inherited from the request, if any.
    pub fn label(&self) -> Option<&str> {
        self.cell.label.as_deref()
    }

    /// Returns the current lifecycle state.
    pub fn status(&self) -> TaskStatus {
        self.cell.status()
    }

    /// Returns `true` once the task has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Blocks the current thread until the task has finished.
    ///
    /// The outcome stays in the handle and can be read later with
    /// [`join`](Self::join).
    pub fn wait(&self) {
        self.cell.wait();
    }

    /// Blocks until the task has finished and returns its outcome.
    ///
    /// A task that failed returns the captured [`DispatchError`].
    ///
    /// [`DispatchError`]: crate::DispatchError
    pub fn join(self) -> Result<T> {
        self.cell.take_outcome()
    }

    pub(crate) fn watch(&self, index: usize, watcher: Sender<usize>) {
        self.cell.watch(index, watcher);
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.cell.id)
            .field("label", &self.cell.label)
            .field("status", &self.status())
            .finish()
    }
}
