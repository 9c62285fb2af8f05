use std::sync::LazyLock;

use regex::Regex;

use super::{check_bounds, parse_prefixed_integer};
use crate::constraint::{range_constraint, Constraint};
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;

static EXPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)[eE][+-]?\d+$").unwrap());

/// Options for an `i64` declaration.
#[derive(Debug, Clone, Default)]
pub struct IntegerKind {
    min: Option<i64>,
    max: Option<i64>,
}

/// Declare a 64-bit signed integer.
///
/// Accepts decimal, `0x`/`0o`/`0b` prefixed, and exponent notation when
/// the result is a whole number (`1e3`).
pub fn integer(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<IntegerKind> {
    DeclarationBuilder::new(env, name, description, IntegerKind::default())
}

impl DeclarationBuilder<IntegerKind> {
    /// Smallest accepted value, inclusive.
    pub fn min(mut self, min: i64) -> Self {
        self.kind.min = Some(min);
        self
    }

    /// Largest accepted value, inclusive.
    pub fn max(mut self, max: i64) -> Self {
        self.kind.max = Some(max);
        self
    }
}

fn parse_integer(raw: &str) -> Result<i64, String> {
    const MESSAGE: &str = "must be an integer";

    if let Some(value) = parse_prefixed_integer(raw) {
        return i64::try_from(value).map_err(|_| MESSAGE.to_string());
    }
    if EXPONENT.is_match(raw) {
        let value: f64 = raw.parse().map_err(|_| MESSAGE.to_string())?;
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            return Ok(value as i64);
        }
    }
    Err(MESSAGE.to_string())
}

impl DeclarationKind for IntegerKind {
    type Value = i64;

    fn schema(&self, constraints: Vec<Constraint<i64>>) -> Result<Schema<i64>, String> {
        check_bounds(self.min.as_ref(), self.max.as_ref())?;

        let mut all: Vec<Constraint<i64>> =
            range_constraint(self.min, self.max, |v| v.to_string()).into_iter().collect();
        all.extend(constraints);
        Ok(Schema::scalar("integer", |v: &i64| v.to_string(), parse_integer, all))
    }

    fn examples(&self) -> Vec<Example<i64>> {
        let mut examples = Vec::new();
        if let Some(min) = self.min {
            examples.push(Example::new(min, "the minimum"));
        }
        if let Some(max) = self.max {
            examples.push(Example::new(max, "the maximum"));
        }
        examples.extend([
            Example::new(0, "zero"),
            Example::new(42, "a positive integer"),
            Example::with_spelling(42, "0x2a", "hexadecimal"),
            Example::with_spelling(1_000_000, "1e6", "exponent notation"),
            Example::new(-1, "a negative integer"),
        ]);
        examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("300"), Ok(300));
        assert_eq!(parse_integer("-7"), Ok(-7));
        assert_eq!(parse_integer("0xff"), Ok(255));
        assert_eq!(parse_integer("1e3"), Ok(1000));
        assert_eq!(parse_integer("1.5e1"), Ok(15));
        assert_eq!(parse_integer("9223372036854775807"), Ok(i64::MAX));
    }

    #[test]
    fn test_parse_integer_rejects() {
        for raw in ["abc", "1.5", "1.5e0", "9223372036854775808", "1e100", "0x", " 1"] {
            assert_eq!(parse_integer(raw), Err("must be an integer".to_string()), "{raw}");
        }
    }

    #[test]
    fn test_range_messages() {
        let env = Environment::with_source(
            MockEnv::new()
                .with_env("LOW", "0")
                .with_env("HIGH", "11")
                .with_env("BOTH", "11"),
        );
        let low = integer(&env, "LOW", "low").min(1).declare().unwrap();
        let high = integer(&env, "HIGH", "high").max(10).declare().unwrap();
        let both = integer(&env, "BOTH", "both").min(1).max(10).declare().unwrap();
        env.mark_initialized();

        assert_eq!(
            low.value().unwrap_err().to_string(),
            "value of LOW (\"0\") is invalid: must be >= 1"
        );
        assert_eq!(
            high.value().unwrap_err().to_string(),
            "value of HIGH (\"11\") is invalid: must be <= 10"
        );
        assert_eq!(
            both.value().unwrap_err().to_string(),
            "value of BOTH (\"11\") is invalid: must be >= 1 and <= 10"
        );
    }

    #[test]
    fn test_min_above_max_rejected() {
        let env = Environment::with_source(MockEnv::new());
        let err = integer(&env, "N", "n").min(5).max(1).declare().unwrap_err();
        assert_eq!(
            err.to_string(),
            "specification for N is invalid: min must be less than or equal to max"
        );
    }

    #[test]
    fn test_generated_examples_respect_range() {
        let kind = IntegerKind {
            min: Some(1),
            max: Some(100),
        };
        let schema = kind.schema(vec![]).unwrap();
        let examples = crate::example::filter_examples(&schema, kind.examples());
        let values: Vec<i64> = examples.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1, 100, 42, 42]);
    }
}
