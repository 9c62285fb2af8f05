use super::{check_bounds, parse_prefixed_integer};
use crate::constraint::{range_constraint, Constraint};
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::Schema;

/// Options for an `i128` declaration.
#[derive(Debug, Clone, Default)]
pub struct BigIntegerKind {
    min: Option<i128>,
    max: Option<i128>,
}

/// Declare a 128-bit signed integer.
///
/// Accepts decimal and `0x`/`0o`/`0b` prefixed input; exponent notation is
/// rejected because it cannot be exact at this width.
pub fn big_integer(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<BigIntegerKind> {
    DeclarationBuilder::new(env, name, description, BigIntegerKind::default())
}

impl DeclarationBuilder<BigIntegerKind> {
    /// Smallest accepted value, inclusive.
    pub fn min(mut self, min: i128) -> Self {
        self.kind.min = Some(min);
        self
    }

    /// Largest accepted value, inclusive.
    pub fn max(mut self, max: i128) -> Self {
        self.kind.max = Some(max);
        self
    }
}

fn parse_big_integer(raw: &str) -> Result<i128, String> {
    parse_prefixed_integer(raw).ok_or_else(|| "must be a big integer".to_string())
}

impl DeclarationKind for BigIntegerKind {
    type Value = i128;

    fn schema(&self, constraints: Vec<Constraint<i128>>) -> Result<Schema<i128>, String> {
        check_bounds(self.min.as_ref(), self.max.as_ref())?;

        let mut all: Vec<Constraint<i128>> =
            range_constraint(self.min, self.max, |v| v.to_string()).into_iter().collect();
        all.extend(constraints);
        Ok(Schema::scalar(
            "big integer",
            |v: &i128| v.to_string(),
            parse_big_integer,
            all,
        ))
    }

    fn examples(&self) -> Vec<Example<i128>> {
        let mut examples = Vec::new();
        if let Some(min) = self.min {
            examples.push(Example::new(min, "the minimum"));
        }
        if let Some(max) = self.max {
            examples.push(Example::new(max, "the maximum"));
        }
        examples.extend([
            Example::new(0, "zero"),
            Example::new(1 << 70, "beyond 64 bits"),
            Example::with_spelling(255, "0xff", "hexadecimal"),
            Example::new(-(1 << 70), "a large negative integer"),
        ]);
        examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn test_parse_big_integer() {
        assert_eq!(
            parse_big_integer("1180591620717411303424"),
            Ok(1_180_591_620_717_411_303_424)
        );
        assert_eq!(parse_big_integer("-0x10"), Ok(-16));
        assert_eq!(parse_big_integer("1e3"), Err("must be a big integer".to_string()));
        assert_eq!(parse_big_integer("12.0"), Err("must be a big integer".to_string()));
    }

    #[test]
    fn test_big_integer_declaration() {
        let env = Environment::with_source(
            MockEnv::new().with_env("SUPPLY", "340282366920938463463374607431768211455"),
        );
        let supply = big_integer(&env, "SUPPLY", "total supply").declare().unwrap();
        env.mark_initialized();
        assert_eq!(
            supply.value().unwrap_err().to_string(),
            "value of SUPPLY (\"340282366920938463463374607431768211455\") is invalid: must be a big integer"
        );
    }

    #[test]
    fn test_big_integer_range() {
        let env = Environment::with_source(MockEnv::new().with_env("ID", "18446744073709551616"));
        let id = big_integer(&env, "ID", "id").min(1 << 64).declare().unwrap();
        env.mark_initialized();
        assert_eq!(id.value().unwrap(), 1 << 64);
    }
}
