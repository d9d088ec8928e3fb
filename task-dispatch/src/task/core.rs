use super::state::{DONE, FAILED, RUNNING, SUBMITTED, TaskStatus};
use crate::error::{DispatchError, Result};
use crate::request::BoundTask;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};

use tracing::{trace, warn};

/// A unit of work that can be executed by a pool worker.
///
/// The `Runnable` trait erases the result type of a job, allowing the pool
/// to keep a heterogeneous queue of `Box<dyn Runnable>`.
pub(crate) trait Runnable: Send {
    /// Executes the job. Called exactly once, by a worker thread.
    fn run(self: Box<Self>);
}

/// Shared completion state of one submitted task.
///
/// The cell is owned jointly by the queued [`Job`] and by the caller's
/// [`TaskHandle`](super::TaskHandle). The job writes the outcome once; the
/// handle reads it once.
pub(crate) struct TaskCell<T> {
    /// Pool-local task number, used in diagnostics.
    pub(crate) id: u64,

    pub(crate) label: Option<Arc<str>>,

    /// Current lifecycle state (SUBMITTED, RUNNING, DONE or FAILED).
    state: AtomicUsize,

    slot: Mutex<Slot<T>>,

    /// Signalled when the task reaches a terminal state.
    finished: Condvar,
}

struct Slot<T> {
    /// Outcome of the task, present from completion until it is read.
    outcome: Option<Result<T>>,

    /// Completion watchers registered by `as_completed`. Each receives its
    /// index once the task is terminal.
    watchers: Vec<(usize, Sender<usize>)>,
}

impl<T> TaskCell<T> {
    pub(crate) fn new(id: u64, label: Option<Arc<str>>) -> Self {
        Self {
            id,
            label,
            state: AtomicUsize::new(SUBMITTED),
            slot: Mutex::new(Slot {
                outcome: None,
                watchers: Vec::new(),
            }),
            finished: Condvar::new(),
        }
    }

    pub(crate) fn status(&self) -> TaskStatus {
        TaskStatus::from_raw(self.state.load(Ordering::Acquire))
    }

    fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    fn mark_running(&self) {
        let _ = self
            .state
            .compare_exchange(SUBMITTED, RUNNING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Records the outcome and wakes everyone waiting on this task.
    ///
    /// Only the first call has an effect; terminal states are final.
    pub(crate) fn complete(&self, outcome: Result<T>) {
        let mut slot = self.slot.lock().unwrap();

        if self.is_terminal() {
            return;
        }

        let terminal = if outcome.is_ok() { DONE } else { FAILED };
        slot.outcome = Some(outcome);
        self.state.store(terminal, Ordering::Release);

        for (index, watcher) in slot.watchers.drain(..) {
            let _ = watcher.send(index);
        }

        drop(slot);
        self.finished.notify_all();
    }

    /// Blocks the current thread until the task is terminal.
    pub(crate) fn wait(&self) {
        let slot = self.slot.lock().unwrap();
        let _slot = self
            .finished
            .wait_while(slot, |_| !self.is_terminal())
            .unwrap();
    }

    /// Waits for the task and moves its outcome out.
    ///
    /// # Panics
    ///
    /// Panics if the outcome was already taken. Handles are not cloneable and
    /// reading consumes them, so this cannot happen through the public API.
    pub(crate) fn take_outcome(&self) -> Result<T> {
        let slot = self.slot.lock().unwrap();
        let mut slot = self
            .finished
            .wait_while(slot, |_| !self.is_terminal())
            .unwrap();

        slot.outcome.take().expect("task outcome already taken")
    }

    /// Sends `index` on `watcher` once the task is terminal, immediately if
    /// it already is.
    ///
    /// The terminal check and the registration happen under the slot lock,
    /// so a completion can never slip between them.
    pub(crate) fn watch(&self, index: usize, watcher: Sender<usize>) {
        let mut slot = self.slot.lock().unwrap();

        if self.is_terminal() {
            let _ = watcher.send(index);
        } else {
            slot.watchers.push((index, watcher));
        }
    }
}

/// A bound task queued on a pool, paired with the cell its handle observes.
pub(crate) struct Job<T> {
    /// The thunk to run. `None` once it has started.
    task: Option<BoundTask<T>>,

    cell: Arc<TaskCell<T>>,
}

impl<T> Job<T> {
    pub(crate) fn new(task: BoundTask<T>, cell: Arc<TaskCell<T>>) -> Self {
        Self {
            task: Some(task),
            cell,
        }
    }
}

impl<T: Send + 'static> Runnable for Job<T> {
    /// Runs the thunk and records its outcome.
    ///
    /// Panics are caught and recorded as [`DispatchError::Panicked`], so a
    /// failing unit never takes its worker down with it.
    fn run(mut self: Box<Self>) {
        let Some(task) = self.task.take() else {
            return;
        };

        self.cell.mark_running();
        trace!(task = self.cell.id, label = ?self.cell.label, "task running");

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task.call())) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let err = DispatchError::from_panic(&*payload);
                warn!(task = self.cell.id, label = ?self.cell.label, error = %err, "task panicked");
                Err(err)
            }
        };

        trace!(task = self.cell.id, ok = outcome.is_ok(), "task finished");
        self.cell.complete(outcome);
    }
}

impl<T> Drop for Job<T> {
    /// Resolves the handle as [`DispatchError::Abandoned`] if the job is
    /// dropped without having run, so waiters never block forever.
    fn drop(&mut self) {
        if self.task.is_some() {
            warn!(task = self.cell.id, label = ?self.cell.label, "task dropped before it ran");
            self.cell.complete(Err(DispatchError::Abandoned));
        }
    }
}

/// Adapts a plain closure to [`Runnable`] for fire-and-forget execution.
pub(crate) struct Closure<F>(pub(crate) F);

impl<F: FnOnce() + Send> Runnable for Closure<F> {
    fn run(self: Box<Self>) {
        let f = self.0;

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
            let err = DispatchError::from_panic(&*payload);
            warn!(error = %err, "detached closure panicked");
        }
    }
}
