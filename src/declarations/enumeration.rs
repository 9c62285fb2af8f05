use std::fmt;

use crate::constraint::Constraint;
use crate::declaration::{DeclarationBuilder, DeclarationKind};
use crate::environment::Environment;
use crate::example::Example;
use crate::schema::{EnumMember, Native, Schema};

/// Options for an enumerated declaration.
pub struct EnumerationKind<T> {
    members: Vec<EnumMember<T>>,
}

impl<T: fmt::Debug> fmt::Debug for EnumerationKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literals: Vec<&str> = self.members.iter().map(|m| m.literal.as_str()).collect();
        f.debug_struct("EnumerationKind")
            .field("literals", &literals)
            .finish()
    }
}

/// Declare a value from a closed set of literals.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// enum Level { Debug, Info }
///
/// let level = enumeration::<Level>(&env, "LOG_LEVEL", "log level")
///     .member("debug", Level::Debug, "everything")
///     .member("info", Level::Info, "the important parts")
///     .default(Level::Info)
///     .declare()?;
/// ```
pub fn enumeration<T: Native>(
    env: &Environment,
    name: impl Into<String>,
    description: impl Into<String>,
) -> DeclarationBuilder<EnumerationKind<T>> {
    DeclarationBuilder::new(
        env,
        name,
        description,
        EnumerationKind {
            members: Vec::new(),
        },
    )
}

impl<T: Native> DeclarationBuilder<EnumerationKind<T>> {
    /// Add a member. Each value may appear only once.
    pub fn member(
        mut self,
        literal: impl Into<String>,
        value: impl Into<T>,
        description: impl Into<String>,
    ) -> Self {
        self.kind.members.push(EnumMember {
            literal: literal.into(),
            value: value.into(),
            description: description.into(),
        });
        self
    }
}

impl<T: Native> DeclarationKind for EnumerationKind<T> {
    type Value = T;

    fn schema(&self, constraints: Vec<Constraint<T>>) -> Result<Schema<T>, String> {
        for (index, member) in self.members.iter().enumerate() {
            if self.members[..index].iter().any(|m| m.value == member.value) {
                return Err(format!("value {:?} is used more than once", member.value));
            }
        }
        Schema::enumeration("enumeration", self.members.clone(), constraints)
    }

    fn examples(&self) -> Vec<Example<T>> {
        self.members
            .iter()
            .map(|member| Example::new(member.value.clone(), member.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;
    use crate::variable::AnyVariable;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Level {
        Debug,
        Info,
        Warn,
    }

    fn level(env: &Environment, name: &str) -> DeclarationBuilder<EnumerationKind<Level>> {
        enumeration(env, name, "log level")
            .member("debug", Level::Debug, "everything")
            .member("info", Level::Info, "the important parts")
            .member("warn", Level::Warn, "only problems")
    }

    #[test]
    fn test_enumeration_resolves() {
        let env = Environment::with_source(
            MockEnv::new()
                .with_env("LEVEL", "warn")
                .with_env("OTHER", "trace"),
        );
        let set = level(&env, "LEVEL").declare().unwrap();
        let unset = level(&env, "UNSET").default(Level::Info).declare().unwrap();
        let other = level(&env, "OTHER").declare().unwrap();
        env.mark_initialized();

        assert_eq!(set.value().unwrap(), Level::Warn);
        assert_eq!(unset.value().unwrap(), Level::Info);
        assert_eq!(
            other.value().unwrap_err().to_string(),
            "value of OTHER (\"trace\") is invalid: expected debug, info, or warn"
        );
    }

    #[test]
    fn test_enumeration_needs_two_members() {
        let env = Environment::with_source(MockEnv::new());
        let err = enumeration::<i64>(&env, "ONE", "one member")
            .member("only", 1, "the only one")
            .declare()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "specification for ONE is invalid: must have at least 2 members"
        );
    }

    #[test]
    fn test_enumeration_rejects_duplicate_value() {
        let env = Environment::with_source(MockEnv::new());
        let err = enumeration::<i64>(&env, "DUP", "duplicate")
            .member("a", 1, "first")
            .member("b", 1, "second")
            .declare()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "specification for DUP is invalid: value 1 is used more than once"
        );
    }

    #[test]
    fn test_enumeration_examples_cover_every_member() {
        let env = Environment::with_source(MockEnv::new());
        level(&env, "LEVEL").declare().unwrap();
        let variables = env.variables();
        let labels: Vec<String> = variables[0].examples().into_iter().map(|e| e.value).collect();
        assert_eq!(labels, vec!["debug", "info", "warn"]);
    }
}
