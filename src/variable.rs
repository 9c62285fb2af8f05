//! Variables: the unit of resolution.
//!
//! A [`Variable`] binds a [`VariableSpec`] to the memoized outcome of
//! resolving it. Resolution happens at most once:
//!
//! ```text
//! Unresolved --first native_value()--> Resolved(value) | Resolved(error)
//! ```
//!
//! Both terminal states are replayed on every later call without reading
//! the environment again or re-running constraints. Only
//! [`AnyVariable::reset`] returns a variable to the unresolved state.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, trace};

use crate::constraint::apply_constraints;
use crate::environment::Environment;
use crate::error::{LifecycleError, ResolveError, SpecificationError, ValueCause, ValueError, VariableError};
use crate::example::{marshal_examples, verify_default, verify_examples, Example, MarshalledExample};
use crate::maybe::Maybe;
use crate::schema::{Native, Schema};

/// Immutable declaration of a variable.
#[derive(Debug)]
pub struct VariableSpec<T> {
    /// The environment key
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// `Undefined` for required, `Defined(None)` for optional, else the default
    pub default: Maybe<Option<T>>,
    /// Whether the value must be kept out of output
    pub is_sensitive: bool,
    /// How to marshal and unmarshal the value
    pub schema: Schema<T>,
    /// Non-empty list of valid examples
    pub examples: Vec<Example<T>>,
}

impl<T: Native> VariableSpec<T> {
    /// Create a spec, verifying its default and examples.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        default: Maybe<Option<T>>,
        is_sensitive: bool,
        schema: Schema<T>,
        examples: Vec<Example<T>>,
    ) -> Result<Self, SpecificationError> {
        let name = name.into();
        verify_default(&name, &schema, &default)?;
        verify_examples(&name, &schema, &examples)?;

        Ok(Self {
            name,
            description: description.into(),
            default,
            is_sensitive,
            schema,
            examples,
        })
    }
}

type Outcome<T> = Result<Maybe<T>, VariableError>;

struct Resolution<T> {
    raw: String,
    outcome: Outcome<T>,
}

/// A declared variable with memoized resolution state.
pub struct Variable<T> {
    spec: VariableSpec<T>,
    resolution: Mutex<Option<Resolution<T>>>,
}

impl<T: Native> Variable<T> {
    /// Create an unresolved variable.
    pub fn new(spec: VariableSpec<T>) -> Self {
        Self {
            spec,
            resolution: Mutex::new(None),
        }
    }

    /// The variable's declaration.
    pub fn spec(&self) -> &VariableSpec<T> {
        &self.spec
    }

    /// Resolve the variable, or replay its memoized outcome.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Lifecycle` if the environment is not
    /// initialized yet (nothing is memoized in that case), or
    /// `ResolveError::Variable` with the memoized resolution error.
    pub fn native_value(&self, env: &Environment) -> Result<Maybe<T>, ResolveError> {
        Ok(self.resolution(env)??)
    }

    /// Resolve a variable that must be defined.
    pub fn defined_value(&self, env: &Environment) -> Result<T, ResolveError> {
        match self.native_value(env)? {
            Maybe::Defined(value) => Ok(value),
            Maybe::Undefined => Err(VariableError::NotSet {
                name: self.spec.name.clone(),
            }
            .into()),
        }
    }

    fn resolution(&self, env: &Environment) -> Result<Outcome<T>, LifecycleError> {
        let mut resolution = self.resolution.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolved) = resolution.as_ref() {
            return Ok(resolved.outcome.clone());
        }

        let raw = env.read(&self.spec.name)?;
        let outcome = self.resolve(&raw);
        log_outcome(&self.spec.name, self.spec.is_sensitive, &raw, &outcome);

        *resolution = Some(Resolution {
            raw,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    fn resolve(&self, raw: &str) -> Outcome<T> {
        if raw.is_empty() {
            return match &self.spec.default {
                Maybe::Defined(Some(value)) => Ok(Maybe::Defined(value.clone())),
                Maybe::Defined(None) => Ok(Maybe::Undefined),
                Maybe::Undefined => Err(VariableError::NotSet {
                    name: self.spec.name.clone(),
                }),
            };
        }

        let value_error = |cause| {
            ValueError::new(self.spec.name.clone(), self.spec.is_sensitive, raw, cause)
        };

        let native = self
            .spec
            .schema
            .unmarshal(raw)
            .map_err(|message| value_error(ValueCause::Invalid(message)))?;
        apply_constraints(self.spec.schema.constraints(), &native)
            .map_err(|e| value_error(ValueCause::Constraints(e)))?;

        Ok(Maybe::Defined(native))
    }

    fn marshal(&self, value: &T) -> String {
        self.spec
            .schema
            .marshal(value)
            .unwrap_or_else(|_| format!("{:?}", value))
    }
}

fn log_outcome<T>(name: &str, is_sensitive: bool, raw: &str, outcome: &Outcome<T>) {
    let result = match outcome {
        Ok(Maybe::Defined(_)) if raw.is_empty() => "default",
        Ok(Maybe::Defined(_)) => "set",
        Ok(Maybe::Undefined) => "undefined",
        Err(e) => e.kind(),
    };
    debug!(variable = %name, outcome = result, "resolved environment variable");
    if !is_sensitive {
        trace!(variable = %name, raw = %raw, "raw environment value");
    }
}

impl<T> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.spec.name)
            .field("is_sensitive", &self.spec.is_sensitive)
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a variable, as held by the registry.
///
/// Values cross this boundary in their marshalled string form, which is all
/// that reporting and documentation collaborators need.
pub trait AnyVariable: Send + Sync {
    /// The environment key.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Whether the value must be kept out of output.
    fn is_sensitive(&self) -> bool;

    /// Short description of the value type.
    fn schema_description(&self) -> &str;

    /// Shape of acceptable input, e.g. `<integer>` or `true | false`.
    fn expected(&self) -> String;

    /// Descriptions of documented constraints.
    fn constraint_descriptions(&self) -> Vec<String>;

    /// Marshalled default: `Undefined` when required.
    fn default_value(&self) -> Maybe<Option<String>>;

    /// Marshalled examples.
    fn examples(&self) -> Vec<MarshalledExample>;

    /// Resolve and marshal the value.
    fn marshalled_value(
        &self,
        env: &Environment,
    ) -> Result<Result<Maybe<String>, VariableError>, LifecycleError>;

    /// Raw string the variable resolved from, once resolved.
    fn raw_value(&self) -> Option<String>;

    /// Forget the memoized resolution.
    fn reset(&self);
}

impl<T: Native> AnyVariable for Variable<T> {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> &str {
        &self.spec.description
    }

    fn is_sensitive(&self) -> bool {
        self.spec.is_sensitive
    }

    fn schema_description(&self) -> &str {
        self.spec.schema.description()
    }

    fn expected(&self) -> String {
        self.spec.schema.expected()
    }

    fn constraint_descriptions(&self) -> Vec<String> {
        self.spec.schema.constraint_descriptions()
    }

    fn default_value(&self) -> Maybe<Option<String>> {
        match &self.spec.default {
            Maybe::Defined(value) => Maybe::Defined(value.as_ref().map(|v| self.marshal(v))),
            Maybe::Undefined => Maybe::Undefined,
        }
    }

    fn examples(&self) -> Vec<MarshalledExample> {
        marshal_examples(&self.spec.schema, &self.spec.examples)
    }

    fn marshalled_value(
        &self,
        env: &Environment,
    ) -> Result<Result<Maybe<String>, VariableError>, LifecycleError> {
        let outcome = self.resolution(env)?;
        Ok(outcome.map(|value| value.map(|v| self.marshal(&v))))
    }

    fn raw_value(&self) -> Option<String> {
        self.resolution
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|resolved| resolved.raw.clone())
    }

    fn reset(&self) {
        *self.resolution.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
