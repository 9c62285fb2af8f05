//! Schemas: the contract between a native value and its canonical string.
//!
//! A [`Schema`] marshals a native value to a string and unmarshals a string
//! back, failing with a message when the string is malformed. Scalar schemas
//! are free-form; enum schemas map a closed set of literals to values.
//!
//! For every accepted value, `unmarshal(marshal(x)) == x`. Declarations
//! check this law against their examples when they are declared.

use std::fmt;
use std::sync::Arc;

use crate::constraint::Constraint;
use crate::words::disjunction;

/// Bounds shared by every native value type a variable can hold.
pub trait Native: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> Native for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

type MarshalFn<T> = dyn Fn(&T) -> String + Send + Sync;
type UnmarshalFn<T> = dyn Fn(&str) -> Result<T, String> + Send + Sync;

/// Marshal/unmarshal contract, either scalar or enumerated.
pub enum Schema<T> {
    /// Free-form, string-backed values
    Scalar(ScalarSchema<T>),
    /// A closed set of literals
    Enum(EnumSchema<T>),
}

/// A free-form schema.
pub struct ScalarSchema<T> {
    description: String,
    marshal: Arc<MarshalFn<T>>,
    unmarshal: Arc<UnmarshalFn<T>>,
    constraints: Vec<Constraint<T>>,
}

/// One literal of an enum schema.
#[derive(Debug, Clone)]
pub struct EnumMember<T> {
    /// The literal string
    pub literal: String,
    /// The value it unmarshals to
    pub value: T,
    /// Human-readable description
    pub description: String,
}

/// A schema over a closed set of literals.
pub struct EnumSchema<T> {
    description: String,
    members: Vec<EnumMember<T>>,
    constraints: Vec<Constraint<T>>,
}

impl<T: Native> Schema<T> {
    /// Create a scalar schema.
    pub fn scalar<M, U>(
        description: impl Into<String>,
        marshal: M,
        unmarshal: U,
        constraints: Vec<Constraint<T>>,
    ) -> Self
    where
        M: Fn(&T) -> String + Send + Sync + 'static,
        U: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        Schema::Scalar(ScalarSchema {
            description: description.into(),
            marshal: Arc::new(marshal),
            unmarshal: Arc::new(unmarshal),
            constraints,
        })
    }

    /// Create an enum schema.
    ///
    /// Requires at least two members, no empty literals, and no literal
    /// used twice. Literals that map to an equal value are allowed; the
    /// first one listed is the canonical spelling.
    pub fn enumeration(
        description: impl Into<String>,
        members: Vec<EnumMember<T>>,
        constraints: Vec<Constraint<T>>,
    ) -> Result<Self, String> {
        if members.len() < 2 {
            return Err("must have at least 2 members".to_string());
        }
        for (index, member) in members.iter().enumerate() {
            if member.literal.is_empty() {
                return Err("literals can't be empty strings".to_string());
            }
            if members[..index].iter().any(|m| m.literal == member.literal) {
                return Err(format!("literal {:?} is used more than once", member.literal));
            }
        }

        Ok(Schema::Enum(EnumSchema {
            description: description.into(),
            members,
            constraints,
        }))
    }

    /// Short description of the value type, e.g. `integer`.
    pub fn description(&self) -> &str {
        match self {
            Schema::Scalar(s) => &s.description,
            Schema::Enum(e) => &e.description,
        }
    }

    /// Convert a native value to its canonical string.
    ///
    /// Fails only for enum schemas when the value is not a member.
    pub fn marshal(&self, value: &T) -> Result<String, String> {
        match self {
            Schema::Scalar(s) => Ok((s.marshal)(value)),
            Schema::Enum(e) => e
                .members
                .iter()
                .find(|m| &m.value == value)
                .map(|m| m.literal.clone())
                .ok_or_else(|| format!("must be {}", disjunction(&e.literals()))),
        }
    }

    /// Parse a raw string into a native value.
    pub fn unmarshal(&self, raw: &str) -> Result<T, String> {
        match self {
            Schema::Scalar(s) => (s.unmarshal)(raw),
            Schema::Enum(e) => e
                .members
                .iter()
                .find(|m| m.literal == raw)
                .map(|m| m.value.clone())
                .ok_or_else(|| format!("expected {}", disjunction(&e.literals()))),
        }
    }

    /// Every constraint, intrinsic and extrinsic.
    pub fn constraints(&self) -> &[Constraint<T>] {
        match self {
            Schema::Scalar(s) => &s.constraints,
            Schema::Enum(e) => &e.constraints,
        }
    }

    /// Descriptions of the documented constraints.
    pub fn constraint_descriptions(&self) -> Vec<String> {
        self.constraints()
            .iter()
            .filter_map(|c| c.description().map(str::to_string))
            .collect()
    }

    /// Human-readable shape of acceptable input, e.g. `<integer>` or `y | n`.
    pub fn expected(&self) -> String {
        match self {
            Schema::Scalar(s) => format!("<{}>", s.description),
            Schema::Enum(e) => e.literals().join(" | "),
        }
    }

    /// Enum members, if this is an enum schema.
    pub fn members(&self) -> Option<&[EnumMember<T>]> {
        match self {
            Schema::Scalar(_) => None,
            Schema::Enum(e) => Some(&e.members),
        }
    }
}

impl<T> EnumSchema<T> {
    fn literals(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.literal.as_str()).collect()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Scalar(s) => f
                .debug_struct("Scalar")
                .field("description", &s.description)
                .field("constraints", &s.constraints)
                .finish_non_exhaustive(),
            Schema::Enum(e) => f
                .debug_struct("Enum")
                .field("description", &e.description)
                .field("literals", &e.literals())
                .field("constraints", &e.constraints)
                .finish(),
        }
    }
}
