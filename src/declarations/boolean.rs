use crate::constraint::Constraint;
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::{EnumMember, Schema};

/// Options for a `bool` declaration.
#[derive(Debug, Clone)]
pub struct BooleanKind {
    true_literals: Vec<String>,
    false_literals: Vec<String>,
}

impl Default for BooleanKind {
    fn default() -> Self {
        Self {
            true_literals: vec!["true".to_string()],
            false_literals: vec!["false".to_string()],
        }
    }
}

/// Declare a boolean, spelled `true` or `false` unless `literals` is given.
pub fn boolean(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<BooleanKind> {
    DeclarationBuilder::new(env, name, description, BooleanKind::default())
}

impl DeclarationBuilder<BooleanKind> {
    /// Replace the accepted spellings.
    ///
    /// The first literal on each side is the canonical spelling.
    pub fn literals<T, F>(mut self, true_literals: T, false_literals: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.kind.true_literals = true_literals.into_iter().map(Into::into).collect();
        self.kind.false_literals = false_literals.into_iter().map(Into::into).collect();
        self
    }
}

impl BooleanKind {
    fn members(&self) -> Vec<EnumMember<bool>> {
        let mut members = Vec::new();
        for (literals, value) in [(&self.true_literals, true), (&self.false_literals, false)] {
            members.extend(literals.iter().map(|literal| EnumMember {
                literal: literal.clone(),
                value,
                description: value.to_string(),
            }));
        }
        members
    }
}

impl DeclarationKind for BooleanKind {
    type Value = bool;

    fn schema(&self, constraints: Vec<Constraint<bool>>) -> Result<Schema<bool>, String> {
        if self.true_literals.is_empty() {
            return Err("true literals can't be empty".to_string());
        }
        if self.false_literals.is_empty() {
            return Err("false literals can't be empty".to_string());
        }
        if let Some(both) = self
            .true_literals
            .iter()
            .find(|literal| self.false_literals.contains(literal))
        {
            return Err(format!("literal {:?} can't be both true and false", both));
        }

        Schema::enumeration("boolean", self.members(), constraints)
    }

    fn examples(&self) -> Vec<Example<bool>> {
        self.members()
            .into_iter()
            .map(|member| {
                let label = member.value.to_string();
                Example::with_spelling(member.value, member.literal, label)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;
    use crate::error::Error;

    #[test]
    fn test_default_literals() {
        let env = Environment::with_source(
            MockEnv::new().with_env("A", "true").with_env("B", "false"),
        );
        let a = boolean(&env, "A", "a").declare().unwrap();
        let b = boolean(&env, "B", "b").declare().unwrap();
        env.mark_initialized();
        assert!(a.value().unwrap());
        assert!(!b.value().unwrap());
    }

    #[test]
    fn test_custom_literals() {
        let env = Environment::with_source(
            MockEnv::new()
                .with_env("DEBUG", "y")
                .with_env("VERBOSE", "maybe"),
        );
        let debug = boolean(&env, "DEBUG", "debug")
            .literals(["y"], ["n"])
            .declare()
            .unwrap();
        let verbose = boolean(&env, "VERBOSE", "verbose")
            .literals(["y"], ["n"])
            .declare()
            .unwrap();
        env.mark_initialized();

        assert!(debug.value().unwrap());
        assert_eq!(
            verbose.value().unwrap_err().to_string(),
            "value of VERBOSE (\"maybe\") is invalid: expected y or n"
        );
    }

    #[test]
    fn test_several_spellings() {
        let env = Environment::with_source(MockEnv::new().with_env("A", "on"));
        let a = boolean(&env, "A", "a")
            .literals(["yes", "on", "1"], ["no", "off", "0"])
            .declare()
            .unwrap();
        env.mark_initialized();
        assert!(a.value().unwrap());
    }

    #[test]
    fn test_invalid_literals_rejected() {
        let env = Environment::with_source(MockEnv::new());
        let cases: [(Vec<&str>, Vec<&str>, &str); 4] = [
            (vec![], vec!["n"], "true literals can't be empty"),
            (vec!["y"], vec!["y"], "literal \"y\" can't be both true and false"),
            (vec![""], vec!["n"], "literals can't be empty strings"),
            (vec!["y", "y"], vec!["n"], "literal \"y\" is used more than once"),
        ];
        for (index, (t, f, message)) in cases.into_iter().enumerate() {
            let err = boolean(&env, format!("B{}", index), "b")
                .literals(t, f)
                .declare()
                .unwrap_err();
            let Error::Specification(e) = err else {
                panic!("expected a specification error");
            };
            assert_eq!(e.message, message);
        }
    }

    #[test]
    fn test_marshal_uses_first_literal() {
        let kind = BooleanKind {
            true_literals: vec!["yes".to_string(), "on".to_string()],
            false_literals: vec!["no".to_string()],
        };
        let schema = kind.schema(vec![]).unwrap();
        assert_eq!(schema.marshal(&true), Ok("yes".to_string()));
        assert_eq!(schema.expected(), "yes | on | no");
    }
}
