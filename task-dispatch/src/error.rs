//! Error types shared by the request, task, and pool layers.
//!
//! Failures are never raised where they happen. A unit of work that fails
//! (by returning an error, by rejecting its bound arguments, or by panicking)
//! has its failure captured on its [`TaskHandle`](crate::TaskHandle) and
//! re-surfaced only when that handle's outcome is read.

use std::any::Any;
use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Error type produced by callables.
///
/// Any error that converts into a boxed `Error + Send + Sync` can be returned
/// from a [`Callable`](crate::Callable); string literals and `String`s work too.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

/// Errors observed when reading the outcome of a dispatched unit of work,
/// or when building a pool.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The callable could not be invoked with its bound arguments.
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),

    /// The unit of work ran and returned an error.
    #[error("task failed: {0}")]
    Failed(#[source] BoxError),

    /// The unit of work panicked while running on a worker.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The job was dropped by its pool without ever running.
    #[error("task was dropped before it ran")]
    Abandoned,

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
}

impl DispatchError {
    /// Classifies an error returned by a callable.
    ///
    /// Errors that are [`BindingError`]s (usually forwarded with `?` from an
    /// [`Arguments`](crate::Arguments) accessor) are reported as binding
    /// failures; anything else is a unit failure.
    pub(crate) fn from_unit(err: BoxError) -> Self {
        match err.downcast::<BindingError>() {
            Ok(binding) => DispatchError::Binding(*binding),
            Err(other) => DispatchError::Failed(other),
        }
    }

    /// Builds a [`DispatchError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        DispatchError::Panicked(message)
    }

    /// Returns `true` if the callable rejected its bound arguments.
    pub fn is_binding(&self) -> bool {
        matches!(self, DispatchError::Binding(_))
    }

    /// Returns `true` if the unit of work itself failed, either by returning
    /// an error or by panicking.
    pub fn is_unit_failure(&self) -> bool {
        matches!(self, DispatchError::Failed(_) | DispatchError::Panicked(_))
    }
}

/// A callable could not be applied to its bound arguments.
///
/// Binding is checked when the unit runs, not when the request is built,
/// so these errors travel through the task handle like any other failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// No positional argument at `index`.
    #[error("missing positional argument {index} (bundle holds {len})")]
    MissingPositional { index: usize, len: usize },

    /// The positional argument at `index` was already taken.
    #[error("positional argument {index} was already taken")]
    PositionalTaken { index: usize },

    /// The positional argument at `index` has a different type.
    #[error("positional argument {index} is not a `{expected}`")]
    PositionalType { index: usize, expected: &'static str },

    /// No named argument called `name`.
    #[error("missing named argument `{name}`")]
    MissingNamed { name: String },

    /// The named argument `name` has a different type.
    #[error("named argument `{name}` is not a `{expected}`")]
    NamedType { name: String, expected: &'static str },

    /// The number of positional arguments does not match the callable.
    #[error("expected {expected} positional arguments, got {found}")]
    Arity { expected: usize, found: usize },
}
