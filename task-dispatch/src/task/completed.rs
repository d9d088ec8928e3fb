use super::TaskHandle;

use std::iter::FusedIterator;
use std::sync::mpsc::{self, Receiver};

/// An iterator over task handles in the order the tasks finish.
///
/// Created by [`as_completed`]. Each call to `next` blocks until another
/// task reaches a terminal state and then yields its handle, which can be
/// joined without further blocking.
pub struct AsCompleted<T> {
    /// Handles not yet yielded, indexed by their position in the input.
    handles: Vec<Option<TaskHandle<T>>>,

    /// Number of handles not yet yielded.
    remaining: usize,

    /// Receives the input position of each task as it finishes.
    completions: Receiver<usize>,
}

/// Yields `handles` in completion order rather than input order.
///
/// Tasks that are already finished when this is called are yielded first.
/// Completion order across workers is inherently non-deterministic; use the
/// input order of the handles when positional correspondence matters.
///
/// # Examples
///
/// ```rust,ignore
/// let handles = submit_only(&pool, requests);
///
/// for handle in as_completed(handles) {
///     println!("task {} finished: {:?}", handle.id(), handle.join());
/// }
/// ```
pub fn as_completed<T, I>(handles: I) -> AsCompleted<T>
where
    I: IntoIterator<Item = TaskHandle<T>>,
{
    let (sender, completions) = mpsc::channel();

    let handles: Vec<_> = handles
        .into_iter()
        .enumerate()
        .map(|(index, handle)| {
            handle.watch(index, sender.clone());
            Some(handle)
        })
        .collect();

    let remaining = handles.len();

    AsCompleted {
        handles,
        remaining,
        completions,
    }
}

impl<T> Iterator for AsCompleted<T> {
    type Item = TaskHandle<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        // Every watcher sends exactly once, and a job that never runs still
        // completes as abandoned, so this only fails if a sender was lost.
        let index = self.completions.recv().ok()?;
        self.remaining -= 1;

        self.handles.get_mut(index)?.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for AsCompleted<T> {}

impl<T> FusedIterator for AsCompleted<T> {}
