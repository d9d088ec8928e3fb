use super::arguments::Arguments;
use super::descriptor::{Callable, TaskRequest};
use crate::error::{DispatchError, Result};

use std::fmt;
use std::sync::Arc;

/// A zero-argument thunk produced by binding a [`TaskRequest`].
///
/// Calling it applies the original callable to exactly the arguments the
/// request carried. A `BoundTask` runs at most once.
pub struct BoundTask<T> {
    callable: Callable<T>,
    args: Arguments,
    label: Option<Arc<str>>,
}

impl<T: 'static> BoundTask<T> {
    pub(crate) fn new(callable: Callable<T>, args: Arguments, label: Option<Arc<str>>) -> Self {
        Self {
            callable,
            args,
            label,
        }
    }

    /// Returns the label inherited from the request.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn label_arc(&self) -> Option<Arc<str>> {
        self.label.clone()
    }

    /// Runs the thunk on the current thread.
    ///
    /// Errors returned by the callable are classified: a [`BindingError`]
    /// becomes [`DispatchError::Binding`], anything else
    /// [`DispatchError::Failed`]. Panics are not caught here; the pool
    /// catches them when it runs the thunk on a worker.
    ///
    /// [`BindingError`]: crate::BindingError
    pub fn call(self) -> Result<T> {
        self.callable
            .invoke(self.args)
            .map_err(DispatchError::from_unit)
    }
}

impl<T> fmt::Debug for BoundTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundTask")
            .field("label", &self.label)
            .field("args", &self.args)
            .finish()
    }
}

/// Binds every request to its arguments.
///
/// The output has the same length and order as the input: thunk `i` invokes
/// request `i`. Nothing runs until a thunk is called or submitted.
pub fn bind<T, I>(requests: I) -> Vec<BoundTask<T>>
where
    T: 'static,
    I: IntoIterator<Item = TaskRequest<T>>,
{
    requests.into_iter().map(TaskRequest::bind).collect()
}
