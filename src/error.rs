//! Error types for the envspec library.
//!
//! Errors fall into two families:
//!
//! - **Declaration time**: [`SpecificationError`] is returned by a builder's
//!   `declare()` when the declaration itself is wrong (conflicting bounds,
//!   an invalid example, an empty enumeration literal). These are authoring
//!   mistakes and are never deferred.
//! - **Resolution time**: [`VariableError`] describes why a variable's value
//!   could not be resolved. The validation pass captures these per variable
//!   and accumulates them into [`VariableErrors`] with stillwater's
//!   `Semigroup`, so every problem is reported together.
//!
//! [`LifecycleError`] guards the declare-then-initialize discipline of the
//! [`Environment`](crate::Environment).

use std::fmt;

use stillwater::{NonEmptyVec, Semigroup, Validation};

use crate::constraint::ConstraintsError;
use crate::words::conjunction;

/// Placeholder shown instead of the raw value of a sensitive variable.
pub const SENSITIVE_PLACEHOLDER: &str = "<sensitive value>";

/// A declaration is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("specification for {name} is invalid: {message}")]
pub struct SpecificationError {
    /// Name of the variable being declared
    pub name: String,
    /// What is wrong with the declaration
    pub message: String,
}

impl SpecificationError {
    /// Create a new specification error.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// The environment was used out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// A variable was read before `initialize()`
    #[error("{name} can not be read until the environment is initialized")]
    Uninitialized { name: String },

    /// A variable was declared after `initialize()`
    #[error("{name} can not be declared after the environment is initialized")]
    Finalized { name: String },
}

/// Why a present value was rejected.
#[derive(Debug, Clone)]
pub enum ValueCause {
    /// The raw string could not be unmarshalled
    Invalid(String),
    /// The unmarshalled value violated one or more constraints
    Constraints(ConstraintsError),
}

impl fmt::Display for ValueCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCause::Invalid(message) => write!(f, "{}", message),
            ValueCause::Constraints(error) => write!(f, "{}", error),
        }
    }
}

/// A variable is set, but its value is invalid.
#[derive(Clone)]
pub struct ValueError {
    /// Name of the variable
    pub name: String,
    /// Whether the raw value must be kept out of output
    pub is_sensitive: bool,
    raw: String,
    /// Why the value was rejected
    pub cause: ValueCause,
}

impl ValueError {
    /// Create a new value error.
    pub fn new(
        name: impl Into<String>,
        is_sensitive: bool,
        raw: impl Into<String>,
        cause: ValueCause,
    ) -> Self {
        Self {
            name: name.into(),
            is_sensitive,
            raw: raw.into(),
            cause,
        }
    }

    /// The raw value, unless the variable is sensitive.
    pub fn raw_value(&self) -> Option<&str> {
        if self.is_sensitive {
            None
        } else {
            Some(&self.raw)
        }
    }

    pub(crate) fn unredacted_value(&self) -> &str {
        &self.raw
    }

    /// The raw value, or the sensitive placeholder.
    pub fn display_value(&self) -> &str {
        self.raw_value().unwrap_or(SENSITIVE_PLACEHOLDER)
    }
}

impl fmt::Debug for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueError")
            .field("name", &self.name)
            .field("is_sensitive", &self.is_sensitive)
            .field("raw", &self.display_value())
            .field("cause", &self.cause)
            .finish()
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sensitive {
            write!(f, "value of {} is invalid: {}", self.name, self.cause)
        } else {
            write!(
                f,
                "value of {} ({:?}) is invalid: {}",
                self.name, self.raw, self.cause
            )
        }
    }
}

impl std::error::Error for ValueError {}

/// One constituent of a composite, as seen when blaming it.
#[derive(Clone)]
pub struct CompositePart {
    /// Name of the constituent variable
    pub name: String,
    /// Whether the constituent is sensitive
    pub is_sensitive: bool,
    /// Raw value the constituent was set to
    pub raw: String,
}

impl fmt::Debug for CompositePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = if self.is_sensitive {
            SENSITIVE_PLACEHOLDER
        } else {
            &self.raw
        };
        f.debug_struct("CompositePart")
            .field("name", &self.name)
            .field("is_sensitive", &self.is_sensitive)
            .field("raw", &raw)
            .finish()
    }
}

/// All constituents of a composite are set, but together they are invalid.
#[derive(Debug, Clone)]
pub struct CompositeError {
    /// Every constituent of the composite
    pub parts: Vec<CompositePart>,
    /// Constraint violations of the derived value
    pub cause: ConstraintsError,
}

impl CompositeError {
    /// Names of every constituent.
    pub fn names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    /// Attribute the failure to every constituent.
    ///
    /// The invalidity of a derived value can't be localized to one part, so
    /// each constituent receives a `ValueError` with the same cause.
    pub fn blame(&self) -> Vec<(String, VariableError)> {
        self.parts
            .iter()
            .map(|part| {
                let error = ValueError::new(
                    part.name.clone(),
                    part.is_sensitive,
                    part.raw.clone(),
                    ValueCause::Constraints(self.cause.clone()),
                );
                (part.name.clone(), VariableError::Value(error))
            })
            .collect()
    }
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value of {} is invalid: {}",
            conjunction(&self.names()),
            self.cause
        )
    }
}

impl std::error::Error for CompositeError {}

/// Some, but not all, constituents of a composite are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialCompositeError {
    /// Constituents that are set
    pub set: Vec<String>,
    /// Constituents that are not set
    pub unset: Vec<String>,
}

impl PartialCompositeError {
    /// Attribute the failure to every unset constituent.
    pub fn blame(&self) -> Vec<(String, VariableError)> {
        self.unset
            .iter()
            .map(|name| (name.clone(), VariableError::PartialComposite(self.clone())))
            .collect()
    }
}

impl fmt::Display for PartialCompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let is = if self.set.len() == 1 { "is" } else { "are" };
        let isnt = if self.unset.len() == 1 { "isn't" } else { "aren't" };
        write!(
            f,
            "{} {} set but {} {}, must set all or none",
            conjunction(&self.set),
            is,
            conjunction(&self.unset),
            isnt
        )
    }
}

impl std::error::Error for PartialCompositeError {}

/// A variable could not be resolved.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VariableError {
    /// Required, absent, and without a default
    #[error("{name} is undefined and does not have a default value")]
    NotSet { name: String },

    /// Present, but fails to unmarshal or violates constraints
    #[error(transparent)]
    Value(#[from] ValueError),

    /// A composite's derived value is invalid
    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// A composite is only partially set
    #[error(transparent)]
    PartialComposite(#[from] PartialCompositeError),
}

impl VariableError {
    /// Short name of the error kind, used in logs and machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            VariableError::NotSet { .. } => "not_set",
            VariableError::Value(_) => "value",
            VariableError::Composite(_) => "composite",
            VariableError::PartialComposite(_) => "partial_composite",
        }
    }

    /// Check if this error means the variable is absent.
    pub fn is_not_set(&self) -> bool {
        matches!(self, VariableError::NotSet { .. })
    }
}

/// Why a variable or composite could not be read.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// The environment was used out of order
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The variable could not be resolved
    #[error(transparent)]
    Variable(#[from] VariableError),
}

/// Any error returned by the public API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A declaration is invalid
    #[error(transparent)]
    Specification(#[from] SpecificationError),

    /// The environment was used out of order
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The variable could not be resolved
    #[error(transparent)]
    Variable(#[from] VariableError),

    /// Initialization found invalid variables
    #[error("{0}")]
    Invalid(VariableErrors),
}

impl From<ResolveError> for Error {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::Lifecycle(e) => Error::Lifecycle(e),
            ResolveError::Variable(e) => Error::Variable(e),
        }
    }
}

/// A non-empty collection of variable errors.
///
/// Uses `NonEmptyVec` from stillwater to guarantee at least one error exists.
#[derive(Debug, Clone)]
pub struct VariableErrors(pub NonEmptyVec<VariableError>);

impl VariableErrors {
    /// Create from a single error.
    pub fn single(error: VariableError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(errors: Vec<VariableError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Get the first error (always exists).
    pub fn first(&self) -> &VariableError {
        self.0.head()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty (always false, but required for API consistency).
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over errors.
    pub fn iter(&self) -> impl Iterator<Item = &VariableError> {
        self.0.iter()
    }
}

impl Semigroup for VariableErrors {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl From<VariableError> for VariableErrors {
    fn from(error: VariableError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for VariableErrors {
    type Item = VariableError;
    type IntoIter = std::vec::IntoIter<VariableError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl fmt::Display for VariableErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Environment variable errors ({}):", self.len())?;
        for error in self.iter() {
            writeln!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for VariableErrors {}

/// Validation result type with accumulated variable errors.
pub type EnvValidation<T> = Validation<T, VariableErrors>;

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints_error(messages: &[&str]) -> ConstraintsError {
        let messages: Vec<String> = messages.iter().map(|m| m.to_string()).collect();
        ConstraintsError::from_vec(messages).unwrap()
    }

    #[test]
    fn test_specification_error_display() {
        let err = SpecificationError::new("WEIGHT", "minimum can't be greater than maximum");
        assert_eq!(
            err.to_string(),
            "specification for WEIGHT is invalid: minimum can't be greater than maximum"
        );
    }

    #[test]
    fn test_value_error_display() {
        let err = ValueError::new(
            "WEIGHT",
            false,
            "0",
            ValueCause::Invalid("must be >= 1".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "value of WEIGHT (\"0\") is invalid: must be >= 1"
        );
        assert_eq!(err.raw_value(), Some("0"));
    }

    #[test]
    fn test_sensitive_value_error_is_redacted() {
        let err = ValueError::new(
            "TOKEN",
            true,
            "hunter2",
            ValueCause::Invalid("must be base64 encoded".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "value of TOKEN is invalid: must be base64 encoded"
        );
        assert_eq!(err.raw_value(), None);
        assert_eq!(err.display_value(), SENSITIVE_PLACEHOLDER);
        assert!(!format!("{:?}", err).contains("hunter2"));
    }

    #[test]
    fn test_not_set_display() {
        let err = VariableError::NotSet {
            name: "DEBUG".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "DEBUG is undefined and does not have a default value"
        );
        assert!(err.is_not_set());
        assert_eq!(err.kind(), "not_set");
    }

    #[test]
    fn test_partial_composite_display() {
        let err = PartialCompositeError {
            set: vec!["A_HOST".to_string()],
            unset: vec!["A_PORT".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "A_HOST is set but A_PORT isn't, must set all or none"
        );

        let err = PartialCompositeError {
            set: vec!["A".to_string(), "B".to_string()],
            unset: vec!["C".to_string(), "D".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "A and B are set but C and D aren't, must set all or none"
        );
    }

    #[test]
    fn test_partial_composite_blames_unset() {
        let err = PartialCompositeError {
            set: vec!["A".to_string()],
            unset: vec!["B".to_string(), "C".to_string()],
        };
        let blamed: Vec<String> = err.blame().into_iter().map(|(name, _)| name).collect();
        assert_eq!(blamed, vec!["B", "C"]);
    }

    #[test]
    fn test_composite_blames_every_part() {
        let err = CompositeError {
            parts: vec![
                CompositePart {
                    name: "A_HOST".to_string(),
                    is_sensitive: false,
                    raw: "host".to_string(),
                },
                CompositePart {
                    name: "A_PORT".to_string(),
                    is_sensitive: true,
                    raw: "1234".to_string(),
                },
            ],
            cause: constraints_error(&["must not be local"]),
        };
        assert_eq!(
            err.to_string(),
            "value of A_HOST and A_PORT is invalid: must not be local"
        );

        let blame = err.blame();
        assert_eq!(blame.len(), 2);
        assert_eq!(
            blame[0].1.to_string(),
            "value of A_HOST (\"host\") is invalid: must not be local"
        );
        assert_eq!(
            blame[1].1.to_string(),
            "value of A_PORT is invalid: must not be local"
        );
    }

    #[test]
    fn test_variable_errors_combine() {
        let e1 = VariableErrors::single(VariableError::NotSet {
            name: "A".to_string(),
        });
        let e2 = VariableErrors::single(VariableError::NotSet {
            name: "B".to_string(),
        });
        let combined = e1.combine(e2);
        assert_eq!(combined.len(), 2);
        assert_eq!(
            combined.first().to_string(),
            "A is undefined and does not have a default value"
        );
    }

    #[test]
    fn test_variable_errors_display() {
        let errors = VariableErrors::from_vec(vec![
            VariableError::NotSet {
                name: "A".to_string(),
            },
            VariableError::NotSet {
                name: "B".to_string(),
            },
        ])
        .unwrap();
        let rendered = errors.to_string();
        assert!(rendered.starts_with("Environment variable errors (2):"));
        assert!(rendered.contains("  B is undefined"));
    }

    #[test]
    fn test_lifecycle_error_display() {
        let err = LifecycleError::Uninitialized {
            name: "A".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "A can not be read until the environment is initialized"
        );
    }
}
