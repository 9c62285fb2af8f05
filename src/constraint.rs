//! Constraints over native values.
//!
//! A [`Constraint`] is a predicate that either accepts a value or returns a
//! violation message. Intrinsic constraints are part of a type (an integer
//! must be an integer) and carry no description. Extrinsic constraints are
//! declared by a factory option or by the application and carry a
//! description that documentation collaborators can list.
//!
//! [`apply_constraints`] runs every constraint and accumulates every
//! violation with stillwater's `Validation`, so a value that breaks three
//! rules reports all three.

use std::fmt;
use std::sync::Arc;

use stillwater::{NonEmptyVec, Semigroup, Validation};

use crate::words::conjunction;

type CheckFn<T> = dyn Fn(&T) -> Result<(), String> + Send + Sync;

/// A predicate over a native value.
pub struct Constraint<T> {
    description: Option<String>,
    check: Arc<CheckFn<T>>,
}

impl<T> Constraint<T> {
    /// Create an intrinsic (undocumented) constraint.
    pub fn intrinsic<F>(check: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            description: None,
            check: Arc::new(check),
        }
    }

    /// Create an extrinsic constraint with a human-readable description.
    pub fn extrinsic<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            description: Some(description.into()),
            check: Arc::new(check),
        }
    }

    /// Description of an extrinsic constraint.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Check if this constraint is documented.
    pub fn is_extrinsic(&self) -> bool {
        self.description.is_some()
    }

    /// Check a single value against this constraint.
    pub fn check(&self, value: &T) -> Result<(), String> {
        (self.check)(value)
    }
}

impl<T> Clone for Constraint<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// One or more constraint violations on a single value.
#[derive(Debug, Clone)]
pub struct ConstraintsError(NonEmptyVec<String>);

impl ConstraintsError {
    /// Create from a single violation message.
    pub fn single(message: impl Into<String>) -> Self {
        Self(NonEmptyVec::singleton(message.into()))
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(messages: Vec<String>) -> Option<Self> {
        NonEmptyVec::from_vec(messages).map(Self)
    }

    /// Every violation message, in constraint order.
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty (always false, but required for API consistency).
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Semigroup for ConstraintsError {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl fmt::Display for ConstraintsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", conjunction(&self.messages()))
    }
}

impl std::error::Error for ConstraintsError {}

/// Run every constraint against `value`, collecting every violation.
pub fn apply_constraints<T>(constraints: &[Constraint<T>], value: &T) -> Result<(), ConstraintsError> {
    if constraints.is_empty() {
        return Ok(());
    }

    let validations: Vec<Validation<(), ConstraintsError>> = constraints
        .iter()
        .map(|constraint| match constraint.check(value) {
            Ok(()) => Validation::Success(()),
            Err(message) => Validation::Failure(ConstraintsError::single(message)),
        })
        .collect();

    match Validation::all_vec(validations) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors),
    }
}

/// Constraint that a value is `>= min`, `<= max`, or both.
///
/// Returns `None` when neither bound is given.
pub fn range_constraint<T>(min: Option<T>, max: Option<T>, show: fn(&T) -> String) -> Option<Constraint<T>>
where
    T: PartialOrd + Send + Sync + 'static,
{
    let description = match (&min, &max) {
        (Some(min), Some(max)) => format!("must be >= {} and <= {}", show(min), show(max)),
        (Some(min), None) => format!("must be >= {}", show(min)),
        (None, Some(max)) => format!("must be <= {}", show(max)),
        (None, None) => return None,
    };
    let message = description.clone();

    Some(Constraint::extrinsic(description, move |value: &T| {
        let above = min.as_ref().map_or(true, |min| value >= min);
        let below = max.as_ref().map_or(true, |max| value <= max);
        if above && below {
            Ok(())
        } else {
            Err(message.clone())
        }
    }))
}

/// Constraint on a length measured by `measure`.
pub fn length_constraint<T>(
    min: Option<usize>,
    max: Option<usize>,
    measure: fn(&T) -> usize,
) -> Option<Constraint<T>>
where
    T: 'static,
{
    let description = match (min, max) {
        (Some(min), Some(max)) if min == max => format!("must have a length of {}", min),
        (Some(min), Some(max)) => format!("must have a length between {} and {}", min, max),
        (Some(min), None) => format!("must have a minimum length of {}", min),
        (None, Some(max)) => format!("must have a maximum length of {}", max),
        (None, None) => return None,
    };
    let message = description.clone();

    Some(Constraint::extrinsic(description, move |value: &T| {
        let length = measure(value);
        if min.map_or(true, |min| length >= min) && max.map_or(true, |max| length <= max) {
            Ok(())
        } else {
            Err(message.clone())
        }
    }))
}
