/// Task has been queued on a pool but no worker has picked it up yet.
pub(crate) const SUBMITTED: usize = 0;

/// Task is currently being executed by a worker.
///
/// At most one worker ever observes this state for a given task.
pub(crate) const RUNNING: usize = 1;

/// Task finished and produced a value.
pub(crate) const DONE: usize = 2;

/// Task finished with a captured failure.
pub(crate) const FAILED: usize = 3;

/// Observable lifecycle of a dispatched unit of work.
///
/// Transitions are `Submitted → Running → {Done, Failed}`. The terminal
/// states are final: a task is never retried or resubmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Waiting in the pool's queue.
    Submitted,

    /// Running on a worker thread.
    Running,

    /// Finished with a value.
    Done,

    /// Finished with a failure, which is re-surfaced when the result is read.
    Failed,
}

impl TaskStatus {
    pub(crate) fn from_raw(raw: usize) -> Self {
        match raw {
            SUBMITTED => TaskStatus::Submitted,
            RUNNING => TaskStatus::Running,
            DONE => TaskStatus::Done,
            FAILED => TaskStatus::Failed,
            _ => unreachable!("invalid task state: {raw}"),
        }
    }

    /// Returns `true` for [`Done`](Self::Done) and [`Failed`](Self::Failed).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_maps_every_state() {
        assert_eq!(TaskStatus::from_raw(SUBMITTED), TaskStatus::Submitted);
        assert_eq!(TaskStatus::from_raw(RUNNING), TaskStatus::Running);
        assert_eq!(TaskStatus::from_raw(DONE), TaskStatus::Done);
        assert_eq!(TaskStatus::from_raw(FAILED), TaskStatus::Failed);
    }

    #[test]
    #[should_panic(expected = "invalid task state: 42")]
    fn test_from_raw_rejects_unknown_state() {
        let _ = TaskStatus::from_raw(42);
    }
}
