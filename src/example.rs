//! Examples of acceptable values.
//!
//! Every declaration carries at least one example, either declared by the
//! application or generated by its factory. Examples serve documentation
//! and double as a declaration-time self check: each one must satisfy the
//! schema's constraints and survive a marshal/unmarshal round trip.

use crate::constraint::apply_constraints;
use crate::error::SpecificationError;
use crate::maybe::Maybe;
use crate::schema::{Native, Schema};

/// A sample value with a label.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<T> {
    /// The native value
    pub value: T,
    /// What the example illustrates
    pub label: String,
    /// An alternate spelling that must unmarshal to `value`
    pub as_string: Option<String>,
}

impl<T> Example<T> {
    /// Create an example.
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            as_string: None,
        }
    }

    /// Create an example with an alternate spelling.
    pub fn with_spelling(value: T, as_string: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            as_string: Some(as_string.into()),
        }
    }
}

/// An example in string form, for documentation collaborators.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MarshalledExample {
    /// Canonical string, or the alternate spelling when one was given
    pub value: String,
    /// What the example illustrates
    pub label: String,
}

/// Check a single example against its schema.
fn check_example<T: Native>(schema: &Schema<T>, example: &Example<T>) -> Result<(), String> {
    let marshalled = schema.marshal(&example.value)?;
    let shown = example.as_string.as_deref().unwrap_or(&marshalled);

    apply_constraints(schema.constraints(), &example.value)
        .map_err(|e| format!("example {:?} ({}) is invalid: {}", shown, example.label, e))?;

    let round_trip = schema
        .unmarshal(&marshalled)
        .map_err(|e| format!("example {:?} ({}) is invalid: {}", marshalled, example.label, e))?;
    if round_trip != example.value {
        return Err(format!(
            "example {:?} ({}) does not survive a round trip",
            marshalled, example.label
        ));
    }

    if let Some(as_string) = &example.as_string {
        let alternate = schema
            .unmarshal(as_string)
            .map_err(|e| format!("example {:?} ({}) is invalid: {}", as_string, example.label, e))?;
        if alternate != example.value {
            return Err(format!(
                "example {:?} ({}) does not unmarshal to {:?}",
                as_string, example.label, marshalled
            ));
        }
    }

    Ok(())
}

/// Verify that declared examples are non-empty and valid.
pub fn verify_examples<T: Native>(
    name: &str,
    schema: &Schema<T>,
    examples: &[Example<T>],
) -> Result<(), SpecificationError> {
    if examples.is_empty() {
        return Err(SpecificationError::new(name, "examples can't be empty"));
    }
    for example in examples {
        check_example(schema, example).map_err(|message| SpecificationError::new(name, message))?;
    }
    Ok(())
}

/// Verify that a default value, if any, is valid.
pub fn verify_default<T: Native>(
    name: &str,
    schema: &Schema<T>,
    default: &Maybe<Option<T>>,
) -> Result<(), SpecificationError> {
    let Maybe::Defined(Some(value)) = default else {
        return Ok(());
    };

    let marshalled = schema
        .marshal(value)
        .map_err(|e| SpecificationError::new(name, format!("default value is invalid: {}", e)))?;
    apply_constraints(schema.constraints(), value).map_err(|e| {
        SpecificationError::new(
            name,
            format!("default value {:?} is invalid: {}", marshalled, e),
        )
    })?;

    Ok(())
}

/// Keep only the generated candidates that are valid for `schema`.
pub fn filter_examples<T: Native>(schema: &Schema<T>, candidates: Vec<Example<T>>) -> Vec<Example<T>> {
    candidates
        .into_iter()
        .filter(|example| check_example(schema, example).is_ok())
        .collect()
}

/// Convert examples to their string form.
pub fn marshal_examples<T: Native>(schema: &Schema<T>, examples: &[Example<T>]) -> Vec<MarshalledExample> {
    examples
        .iter()
        .filter_map(|example| {
            let value = match &example.as_string {
                Some(as_string) => as_string.clone(),
                None => schema.marshal(&example.value).ok()?,
            };
            Some(MarshalledExample {
                value,
                label: example.label.clone(),
            })
        })
        .collect()
}
