//! Work descriptors and binding.
//!
//! This module turns a declarative description of work into runnable thunks.
//!
//! It includes:
//! - [`Arguments`], the owned positional and named argument bundle,
//! - [`Callable`], a shareable reference to a unit of work,
//! - [`TaskRequest`], a callable paired with its arguments,
//! - [`BoundTask`] and [`bind`], which turn requests into zero-argument thunks.

mod arguments;
mod bound;
mod descriptor;

#[doc(inline)]
pub use arguments::Arguments;

#[doc(inline)]
pub use bound::{BoundTask, bind};

#[doc(inline)]
pub use descriptor::{Callable, TaskRequest};
