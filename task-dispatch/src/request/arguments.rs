use crate::error::BindingError;

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;

/// A type-erased argument value.
pub(crate) type Value = Box<dyn Any + Send>;

/// The owned argument bundle handed to a callable when it runs.
///
/// An `Arguments` value holds the positional and named arguments bound to a
/// [`TaskRequest`](crate::TaskRequest). Values are stored type-erased and
/// recovered with typed accessors; every mismatch is reported as a
/// [`BindingError`] so the callable can forward it with `?`.
///
/// # Examples
///
/// ```rust,ignore
/// fn scale(mut args: Arguments) -> Result<f64, BoxError> {
///     args.expect_arity(1)?;
///     let value: f64 = args.take(0)?;
///     let factor = args.take_named_or("factor", 1.0)?;
///     Ok(value * factor)
/// }
/// ```
#[derive(Default)]
pub struct Arguments {
    /// Positional values. A slot becomes `None` once taken.
    positional: Vec<Option<Value>>,

    /// Named values, keyed by argument name.
    named: BTreeMap<String, Value>,
}

impl Arguments {
    /// Creates an empty argument bundle.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.positional.push(Some(value));
    }

    /// Inserts a named value. An existing value under the same name is
    /// replaced, so names stay unique.
    pub(crate) fn insert(&mut self, name: String, value: Value) {
        self.named.insert(name, value);
    }

    /// Returns the number of positional arguments, taken or not.
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    /// Returns `true` if there are neither positional nor named arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Returns the number of named arguments still present.
    pub fn named_len(&self) -> usize {
        self.named.len()
    }

    /// Returns `true` if a named argument called `name` is present.
    pub fn contains_named(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Iterates over the names of the named arguments, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    /// Checks that exactly `expected` positional arguments were bound.
    pub fn expect_arity(&self, expected: usize) -> Result<(), BindingError> {
        if self.positional.len() != expected {
            return Err(BindingError::Arity {
                expected,
                found: self.positional.len(),
            });
        }

        Ok(())
    }

    /// Borrows the positional argument at `index` as a `T`.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, BindingError> {
        let slot = self
            .positional
            .get(index)
            .ok_or(BindingError::MissingPositional {
                index,
                len: self.positional.len(),
            })?;

        let value = slot
            .as_ref()
            .ok_or(BindingError::PositionalTaken { index })?;

        value
            .downcast_ref::<T>()
            .ok_or(BindingError::PositionalType {
                index,
                expected: type_name::<T>(),
            })
    }

    /// Moves the positional argument at `index` out of the bundle.
    ///
    /// On a type mismatch the value is left in place, so a second attempt
    /// with the right type still succeeds.
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, BindingError> {
        let len = self.positional.len();
        let slot = self
            .positional
            .get_mut(index)
            .ok_or(BindingError::MissingPositional { index, len })?;

        let value = slot
            .take()
            .ok_or(BindingError::PositionalTaken { index })?;

        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                *slot = Some(value);
                Err(BindingError::PositionalType {
                    index,
                    expected: type_name::<T>(),
                })
            }
        }
    }

    /// Borrows the named argument `name` as a `T`.
    pub fn named<T: Any>(&self, name: &str) -> Result<&T, BindingError> {
        let value = self
            .named
            .get(name)
            .ok_or_else(|| BindingError::MissingNamed {
                name: name.to_string(),
            })?;

        value
            .downcast_ref::<T>()
            .ok_or_else(|| BindingError::NamedType {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Moves the named argument `name` out of the bundle.
    ///
    /// On a type mismatch the value is left in place.
    pub fn take_named<T: Any>(&mut self, name: &str) -> Result<T, BindingError> {
        let value = self
            .named
            .remove(name)
            .ok_or_else(|| BindingError::MissingNamed {
                name: name.to_string(),
            })?;

        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                self.named.insert(name.to_string(), value);
                Err(BindingError::NamedType {
                    name: name.to_string(),
                    expected: type_name::<T>(),
                })
            }
        }
    }

    /// Moves the named argument `name` out of the bundle, or returns
    /// `default` if it was not bound.
    ///
    /// A value bound under `name` with a different type is still an error.
    pub fn take_named_or<T: Any>(&mut self, name: &str, default: T) -> Result<T, BindingError> {
        if !self.named.contains_key(name) {
            return Ok(default);
        }

        self.take_named(name)
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("positional", &self.positional.len())
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .finish()
    }
}
