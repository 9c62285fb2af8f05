use super::MAX_EXAMPLE_LENGTH;
use crate::constraint::{length_constraint, Constraint};
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;

/// Options for a `String` declaration.
#[derive(Debug, Clone, Default)]
pub struct StringKind {
    min_length: Option<usize>,
    max_length: Option<usize>,
}

/// Declare a string.
pub fn string(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<StringKind> {
    DeclarationBuilder::new(env, name, description, StringKind::default())
}

impl DeclarationBuilder<StringKind> {
    /// Bound the length in characters. Either bound may be omitted.
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.kind.min_length = min;
        self.kind.max_length = max;
        self
    }
}

impl DeclarationKind for StringKind {
    type Value = String;

    fn schema(&self, constraints: Vec<Constraint<String>>) -> Result<Schema<String>, String> {
        super::check_bounds(self.min_length.as_ref(), self.max_length.as_ref())?;

        let mut all: Vec<Constraint<String>> =
            length_constraint(self.min_length, self.max_length, |v: &String| v.chars().count())
                .into_iter()
                .collect();
        all.extend(constraints);
        Ok(Schema::scalar(
            "string",
            |v: &String| v.clone(),
            |raw: &str| Ok(raw.to_string()),
            all,
        ))
    }

    fn examples(&self) -> Vec<Example<String>> {
        let length = self.min_length.unwrap_or(3).max(1);
        let mut examples = Vec::new();
        if length <= MAX_EXAMPLE_LENGTH {
            examples.push(Example::new("a".repeat(length), "a string"));
        }
        if let Some(max) = self
            .max_length
            .filter(|max| *max > length && *max <= MAX_EXAMPLE_LENGTH)
        {
            examples.push(Example::new("z".repeat(max), "a string of the maximum length"));
        }
        examples.push(Example::new("hello, world".to_string(), "a phrase"));
        examples
    }
}
