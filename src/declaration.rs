//! Declarations: the application-facing handles.
//!
//! Every factory in [`declarations`](crate::declarations) returns a
//! [`DeclarationBuilder`]. Options shared by every type live here; options
//! specific to one type are inherent methods on that type's builder, so an
//! option that does not apply is a compile error.
//!
//! ```ignore
//! let env = Environment::new();
//! let weight = integer(&env, "WEIGHT", "weight of the thing")
//!     .min(1)
//!     .default(10)
//!     .declare()?;
//! let region = string(&env, "REGION", "deployment region").declare_optional()?;
//!
//! env.initialize()?;
//! let weight: i64 = weight.value()?;
//! let region: Option<String> = region.value()?;
//! ```
//!
//! `declare()` builds the schema, verifies the default and the examples, and
//! registers the variable. Any problem with the declaration itself is
//! returned immediately as `Error::Specification`.

use std::fmt;
use std::sync::Arc;

use crate::composite::{AnyComposite, VariableComposite};
use crate::constraint::Constraint;
use crate::environment::Environment;
use crate::error::{Error, SpecificationError};
use crate::example::{filter_examples, Example};
use crate::maybe::Maybe;
use crate::schema::{Native, Schema};
use crate::variable::{AnyVariable, Variable, VariableSpec};

/// The type-specific half of a declaration.
pub trait DeclarationKind {
    /// Native type of the declared value
    type Value: Native;

    /// Build the schema, appending the declaration's extra `constraints`.
    ///
    /// An `Err` is a mistake in the declaration's options.
    fn schema(&self, constraints: Vec<Constraint<Self::Value>>) -> Result<Schema<Self::Value>, String>;

    /// Candidate examples, used when the declaration provides none.
    ///
    /// Candidates that violate the schema's constraints are dropped.
    fn examples(&self) -> Vec<Example<Self::Value>>;
}

/// Builder for a single-variable declaration.
pub struct DeclarationBuilder<K: DeclarationKind> {
    env: Environment,
    name: String,
    description: String,
    pub(crate) kind: K,
    default: Option<K::Value>,
    is_sensitive: bool,
    constraints: Vec<Constraint<K::Value>>,
    examples: Vec<Example<K::Value>>,
}

impl<K: DeclarationKind> DeclarationBuilder<K> {
    pub(crate) fn new(
        env: &Environment,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: K,
    ) -> Self {
        Self {
            env: env.clone(),
            name: name.into(),
            description: description.into(),
            kind,
            default: None,
            is_sensitive: false,
            constraints: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Value used when the variable is unset or empty.
    pub fn default(mut self, value: impl Into<K::Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Keep the value out of error messages and summaries.
    pub fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }

    /// Add a documented constraint.
    ///
    /// `check` returns the violation message when the value is rejected.
    pub fn constraint<F>(mut self, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&K::Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.constraints.push(Constraint::extrinsic(description, check));
        self
    }

    /// Add an example. Declaring any example replaces the generated ones.
    pub fn example(mut self, value: impl Into<K::Value>, label: impl Into<String>) -> Self {
        self.examples.push(Example::new(value.into(), label));
        self
    }

    /// Add an example with an alternate spelling that must parse to `value`.
    pub fn example_as(
        mut self,
        value: impl Into<K::Value>,
        as_string: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.examples
            .push(Example::with_spelling(value.into(), as_string, label));
        self
    }

    /// Declare a required variable, or a defaulted one if `default` was set.
    pub fn declare(mut self) -> Result<Declaration<K::Value>, Error> {
        let default = match self.default.take() {
            Some(value) => Maybe::Defined(Some(value)),
            None => Maybe::Undefined,
        };
        let (env, variable) = self.register(default)?;
        Ok(Declaration {
            env,
            source: Source::Variable(variable),
        })
    }

    /// Declare a variable that may be left unset.
    ///
    /// A `default` set on the builder still applies.
    pub fn declare_optional(mut self) -> Result<OptionalDeclaration<K::Value>, Error> {
        let default = Maybe::Defined(self.default.take());
        let (env, variable) = self.register(default)?;
        Ok(OptionalDeclaration {
            env,
            source: Source::Variable(variable),
        })
    }

    pub(crate) fn register(
        self,
        default: Maybe<Option<K::Value>>,
    ) -> Result<(Environment, Arc<Variable<K::Value>>), Error> {
        let variable = self.build(default)?;
        self.env.register(variable.clone())?;
        Ok((self.env, variable))
    }

    /// Build the variable without registering it.
    pub(crate) fn build(
        &self,
        default: Maybe<Option<K::Value>>,
    ) -> Result<Arc<Variable<K::Value>>, SpecificationError> {
        Ok(Arc::new(Variable::new(self.build_spec(default)?)))
    }

    fn build_spec(&self, default: Maybe<Option<K::Value>>) -> Result<VariableSpec<K::Value>, SpecificationError> {
        let spec_error = |message: String| SpecificationError::new(self.name.clone(), message);

        let schema = self
            .kind
            .schema(self.constraints.clone())
            .map_err(spec_error)?;

        let examples = if self.examples.is_empty() {
            let generated = filter_examples(&schema, self.kind.examples());
            if generated.is_empty() {
                return Err(spec_error(
                    "examples must be provided because no generated example satisfies the constraints"
                        .to_string(),
                ));
            }
            generated
        } else {
            self.examples.clone()
        };

        VariableSpec::new(
            self.name.clone(),
            self.description.clone(),
            default,
            self.is_sensitive,
            schema,
            examples,
        )
    }
}

impl<K: DeclarationKind + fmt::Debug> fmt::Debug for DeclarationBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationBuilder")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("is_sensitive", &self.is_sensitive)
            .finish_non_exhaustive()
    }
}

pub(crate) enum Source<T> {
    Variable(Arc<Variable<T>>),
    Composite(Arc<VariableComposite<T>>),
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Source::Variable(v) => Source::Variable(Arc::clone(v)),
            Source::Composite(c) => Source::Composite(Arc::clone(c)),
        }
    }
}

impl<T: Native> Source<T> {
    fn native_value(&self, env: &Environment) -> Result<Maybe<T>, Error> {
        Ok(match self {
            Source::Variable(v) => v.native_value(env)?,
            Source::Composite(c) => c.native_value(env)?,
        })
    }

    fn defined_value(&self, env: &Environment) -> Result<T, Error> {
        Ok(match self {
            Source::Variable(v) => v.defined_value(env)?,
            Source::Composite(c) => c.defined_value(env)?,
        })
    }
}

/// Handle to a required (or defaulted) variable.
pub struct Declaration<T> {
    env: Environment,
    source: Source<T>,
}

impl<T: Native> Declaration<T> {
    pub(crate) fn from_composite(env: Environment, composite: Arc<VariableComposite<T>>) -> Self {
        Self {
            env,
            source: Source::Composite(composite),
        }
    }

    /// The resolved value.
    ///
    /// # Errors
    ///
    /// - `Error::Lifecycle` before the environment is initialized
    /// - `Error::Variable` if the value is unset or invalid
    pub fn value(&self) -> Result<T, Error> {
        self.source.defined_value(&self.env)
    }
}

impl<T> Clone for Declaration<T> {
    fn clone(&self) -> Self {
        Self {
            env: self.env.clone(),
            source: self.source.clone(),
        }
    }
}

impl<T: Native> fmt::Debug for Declaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("name", &source_name(&self.source))
            .finish_non_exhaustive()
    }
}

/// Handle to a variable that may be left unset.
pub struct OptionalDeclaration<T> {
    env: Environment,
    source: Source<T>,
}

impl<T: Native> OptionalDeclaration<T> {
    pub(crate) fn from_composite(env: Environment, composite: Arc<VariableComposite<T>>) -> Self {
        Self {
            env,
            source: Source::Composite(composite),
        }
    }

    /// The resolved value, or `None` when unset.
    ///
    /// # Errors
    ///
    /// - `Error::Lifecycle` before the environment is initialized
    /// - `Error::Variable` if the value is invalid
    pub fn value(&self) -> Result<Option<T>, Error> {
        Ok(self.source.native_value(&self.env)?.resolve())
    }
}

impl<T> Clone for OptionalDeclaration<T> {
    fn clone(&self) -> Self {
        Self {
            env: self.env.clone(),
            source: self.source.clone(),
        }
    }
}

impl<T: Native> fmt::Debug for OptionalDeclaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalDeclaration")
            .field("name", &source_name(&self.source))
            .finish_non_exhaustive()
    }
}

fn source_name<T: Native>(source: &Source<T>) -> &str {
    match source {
        Source::Variable(v) => AnyVariable::name(v.as_ref()),
        Source::Composite(c) => AnyComposite::name(c.as_ref()),
    }
}
