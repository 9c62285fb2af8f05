//! Explicit optional values.
//!
//! `Maybe` is used throughout the resolution engine instead of `Option` where
//! "nothing was provided" must stay distinguishable from "a default of nothing
//! was provided". A variable's default is a `Maybe<Option<T>>`:
//!
//! - `Maybe::Undefined` - no default, the variable is required
//! - `Maybe::Defined(None)` - the default is "undefined", the variable is optional
//! - `Maybe::Defined(Some(v))` - the default is `v`
//!
//! Collapsing to `Option` with [`Maybe::resolve`] only happens at the
//! application-facing boundary.

/// A value that is either defined or undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Maybe<T> {
    /// A defined value
    Defined(T),
    /// No value
    #[default]
    Undefined,
}

/// Create a defined value.
pub fn defined_value<T>(value: T) -> Maybe<T> {
    Maybe::Defined(value)
}

/// Create an undefined value.
pub fn undefined_value<T>() -> Maybe<T> {
    Maybe::Undefined
}

impl<T> Maybe<T> {
    /// Check if this value is defined.
    pub fn is_defined(&self) -> bool {
        matches!(self, Maybe::Defined(_))
    }

    /// Apply `f` to a defined value; undefined passes through.
    pub fn map<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Maybe::Defined(value) => Maybe::Defined(f(value)),
            Maybe::Undefined => Maybe::Undefined,
        }
    }

    /// Borrow the inner value.
    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Maybe::Defined(value) => Maybe::Defined(value),
            Maybe::Undefined => Maybe::Undefined,
        }
    }

    /// Project to an `Option`, dropping the defined/undefined distinction.
    pub fn resolve(self) -> Option<T> {
        match self {
            Maybe::Defined(value) => Some(value),
            Maybe::Undefined => None,
        }
    }
}

impl<T> Maybe<Option<T>> {
    /// Flatten a `Maybe<Option<T>>` so that `Defined(None)` becomes `Undefined`.
    pub fn flatten(self) -> Maybe<T> {
        match self {
            Maybe::Defined(Some(value)) => Maybe::Defined(value),
            _ => Maybe::Undefined,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Maybe::Defined(value),
            None => Maybe::Undefined,
        }
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(value: Maybe<T>) -> Self {
        value.resolve()
    }
}
