use super::arguments::Arguments;
use super::bound::BoundTask;
use crate::error::{BindingError, BoxError};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased function behind a [`Callable`].
type CallFn<T> = dyn Fn(Arguments) -> Result<T, BoxError> + Send + Sync;

/// A shareable reference to a unit of work.
///
/// A `Callable` wraps a function that receives its [`Arguments`] bundle and
/// returns either a value or an error. Cloning is cheap: every clone points at
/// the same function, so one callable can back many [`TaskRequest`]s.
///
/// The function must be `Send + Sync` because it may run on any worker thread.
pub struct Callable<T> {
    func: Arc<CallFn<T>>,

    /// Name used in diagnostics and inherited by requests.
    name: Option<Arc<str>>,

    /// Positional arity checked before the function runs, if declared.
    arity: Option<usize>,
}

impl<T: 'static> Callable<T> {
    /// Wraps a function as a callable.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let add = Callable::new(|mut args: Arguments| {
    ///     let a: i32 = args.take(0)?;
    ///     let b: i32 = args.take(1)?;
    ///     Ok::<_, BoxError>(a + b)
    /// });
    /// ```
    pub fn new<F, E>(f: F) -> Self
    where
        F: Fn(Arguments) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            func: Arc::new(move |args: Arguments| -> Result<T, BoxError> {
                f(args).map_err(Into::into)
            }),
            name: None,
            arity: None,
        }
    }

    /// Gives the callable a name, reported in logs and on task handles.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares how many positional arguments the callable accepts.
    ///
    /// A request bound with a different number of positional arguments
    /// fails with [`BindingError::Arity`] when it runs, without calling
    /// the function.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Returns the callable's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Starts a new request for this callable with no arguments bound.
    pub fn request(&self) -> TaskRequest<T> {
        TaskRequest::from_callable(self.clone())
    }

    /// Applies the callable to `args`.
    pub(crate) fn invoke(&self, args: Arguments) -> Result<T, BoxError> {
        if let Some(expected) = self.arity {
            args.expect_arity(expected)?;
        }

        (self.func)(args)
    }
}

impl<T> Clone for Callable<T> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
            name: self.name.clone(),
            arity: self.arity,
        }
    }
}

impl<T> fmt::Debug for Callable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A deferred call: a callable plus the arguments it will be invoked with.
///
/// Requests are built once, with the consuming builder methods below, and
/// consumed exactly once when they are bound. They are never mutated after
/// construction.
///
/// # Examples
///
/// ```rust,ignore
/// let request = TaskRequest::new(scale)
///     .arg(2.5_f64)
///     .kwarg("factor", 4.0_f64);
/// ```
pub struct TaskRequest<T> {
    callable: Callable<T>,
    args: Arguments,
    label: Option<Arc<str>>,
}

impl<T: 'static> TaskRequest<T> {
    /// Creates a request for a fresh callable wrapping `f`.
    pub fn new<F, E>(f: F) -> Self
    where
        F: Fn(Arguments) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::from_callable(Callable::new(f))
    }

    /// Creates a request for an existing callable.
    ///
    /// The request is labelled with the callable's name, if any.
    pub fn from_callable(callable: Callable<T>) -> Self {
        let label = callable.name.clone();

        Self {
            callable,
            args: Arguments::new(),
            label,
        }
    }

    /// Appends a positional argument.
    pub fn arg<A: Any + Send>(mut self, value: A) -> Self {
        self.args.push(Box::new(value));
        self
    }

    /// Appends every value of `values` as a positional argument.
    pub fn args<I, A>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Any + Send,
    {
        for value in values {
            self.args.push(Box::new(value));
        }
        self
    }

    /// Binds a named argument. Binding the same name twice keeps the last value.
    pub fn kwarg<A: Any + Send>(mut self, name: impl Into<String>, value: A) -> Self {
        self.args.insert(name.into(), Box::new(value));
        self
    }

    /// Overrides the label reported for this request.
    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the request's label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the bound arguments.
    pub fn arguments(&self) -> &Arguments {
        &self.args
    }

    /// Checks the bound positional arguments against the callable's declared
    /// arity without running anything.
    pub fn check_arity(&self) -> Result<(), BindingError> {
        match self.callable.arity {
            Some(expected) => self.args.expect_arity(expected),
            None => Ok(()),
        }
    }

    /// Turns the request into a zero-argument thunk.
    pub fn bind(self) -> BoundTask<T> {
        BoundTask::new(self.callable, self.args, self.label)
    }
}

impl<T> fmt::Debug for TaskRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRequest")
            .field("label", &self.label)
            .field("args", &self.args)
            .finish()
    }
}
