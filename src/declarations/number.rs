use super::{check_bounds, parse_prefixed_integer};
use crate::constraint::{range_constraint, Constraint};
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;

/// Options for an `f64` declaration.
#[derive(Debug, Clone, Default)]
pub struct NumberKind {
    min: Option<f64>,
    max: Option<f64>,
}

/// Declare a finite floating point number.
pub fn number(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<NumberKind> {
    DeclarationBuilder::new(env, name, description, NumberKind::default())
}

impl DeclarationBuilder<NumberKind> {
    /// Smallest accepted value, inclusive.
    pub fn min(mut self, min: f64) -> Self {
        self.kind.min = Some(min);
        self
    }

    /// Largest accepted value, inclusive.
    pub fn max(mut self, max: f64) -> Self {
        self.kind.max = Some(max);
        self
    }
}

fn parse_number(raw: &str) -> Result<f64, String> {
    if let Some(value) = parse_prefixed_integer(raw) {
        return Ok(value as f64);
    }
    // `f64::from_str` also takes "inf" and "NaN"
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err("must be numeric".to_string()),
    }
}

impl DeclarationKind for NumberKind {
    type Value = f64;

    fn schema(&self, constraints: Vec<Constraint<f64>>) -> Result<Schema<f64>, String> {
        if self.min.is_some_and(|v| !v.is_finite()) || self.max.is_some_and(|v| !v.is_finite()) {
            return Err("min and max must be finite".to_string());
        }
        check_bounds(self.min.as_ref(), self.max.as_ref())?;

        let mut all: Vec<Constraint<f64>> =
            range_constraint(self.min, self.max, |v| v.to_string()).into_iter().collect();
        all.extend(constraints);
        Ok(Schema::scalar("number", |v: &f64| v.to_string(), parse_number, all))
    }

    fn examples(&self) -> Vec<Example<f64>> {
        let mut examples = Vec::new();
        if let Some(min) = self.min {
            examples.push(Example::new(min, "the minimum"));
        }
        if let Some(max) = self.max {
            examples.push(Example::new(max, "the maximum"));
        }
        examples.extend([
            Example::new(0.0, "zero"),
            Example::new(1.5, "a decimal"),
            Example::with_spelling(1500.0, "1.5e3", "exponent notation"),
            Example::new(-0.25, "a negative number"),
        ]);
        examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1.5"), Ok(1.5));
        assert_eq!(parse_number("-2"), Ok(-2.0));
        assert_eq!(parse_number("1e-3"), Ok(0.001));
        assert_eq!(parse_number("0x10"), Ok(16.0));
        assert_eq!(parse_number(".5"), Ok(0.5));
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        for raw in ["inf", "-infinity", "NaN", "1e400", "one", "1,5"] {
            assert_eq!(parse_number(raw), Err("must be numeric".to_string()), "{raw}");
        }
    }

    #[test]
    fn test_number_range() {
        let env = Environment::with_source(MockEnv::new().with_env("RATIO", "1.5"));
        let ratio = number(&env, "RATIO", "a ratio").min(0.0).max(1.0).declare().unwrap();
        env.mark_initialized();
        assert_eq!(
            ratio.value().unwrap_err().to_string(),
            "value of RATIO (\"1.5\") is invalid: must be >= 0 and <= 1"
        );
    }

    #[test]
    fn test_marshal_round_trips() {
        let schema = NumberKind::default().schema(vec![]).unwrap();
        for value in [0.1, 1e21, -3.75, 123456.789] {
            let marshalled = schema.marshal(&value).unwrap();
            assert_eq!(schema.unmarshal(&marshalled), Ok(value));
        }
    }
}
