//! Composites: one value derived from several variables.
//!
//! A [`VariableComposite`] enforces that its constituents are set together
//! or not at all. Resolution is memoized like a [`Variable`](crate::Variable):
//!
//! 1. Resolve every constituent. A constituent's own error is the
//!    composite's error.
//! 2. None set: the composite is undefined.
//! 3. Some set: [`PartialCompositeError`] naming both groups.
//! 4. All set: derive the value, then apply the composite's constraints.
//!    A violation becomes a [`CompositeError`] blaming every constituent.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::constraint::{apply_constraints, Constraint};
use crate::environment::Environment;
use crate::error::{
    CompositeError, CompositePart, LifecycleError, PartialCompositeError, ResolveError,
    SpecificationError, VariableError,
};
use crate::maybe::Maybe;
use crate::schema::Native;
use crate::variable::AnyVariable;
use crate::words::conjunction;

type ResolveFn<T> = dyn Fn(&Environment) -> Result<T, ResolveError> + Send + Sync;
type Outcome<T> = Result<Maybe<T>, VariableError>;

/// A value derived from two or more variables.
pub struct VariableComposite<T> {
    name: String,
    variables: Vec<Arc<dyn AnyVariable>>,
    resolve: Box<ResolveFn<T>>,
    constraints: Vec<Constraint<T>>,
    is_required: bool,
    resolution: Mutex<Option<Outcome<T>>>,
}

impl<T: Native> VariableComposite<T> {
    /// Create a composite over `variables`.
    ///
    /// `resolve` is only called once every constituent is set, so it may
    /// read each constituent as defined.
    pub fn new<F>(
        name: impl Into<String>,
        variables: Vec<Arc<dyn AnyVariable>>,
        resolve: F,
        constraints: Vec<Constraint<T>>,
        is_required: bool,
    ) -> Result<Self, SpecificationError>
    where
        F: Fn(&Environment) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        let name = name.into();
        if variables.len() < 2 {
            return Err(SpecificationError::new(
                name,
                "composites must have at least 2 variables",
            ));
        }

        Ok(Self {
            name,
            variables,
            resolve: Box::new(resolve),
            constraints,
            is_required,
            resolution: Mutex::new(None),
        })
    }

    /// Resolve the composite, or replay its memoized outcome.
    pub fn native_value(&self, env: &Environment) -> Result<Maybe<T>, ResolveError> {
        Ok(self.resolution(env)??)
    }

    /// Resolve a composite that must be defined.
    ///
    /// An undefined composite is reported as every constituent being unset.
    pub fn defined_value(&self, env: &Environment) -> Result<T, ResolveError> {
        match self.native_value(env)? {
            Maybe::Defined(value) => Ok(value),
            Maybe::Undefined => Err(VariableError::NotSet {
                name: conjunction(&self.variable_names()),
            }
            .into()),
        }
    }

    fn resolution(&self, env: &Environment) -> Result<Outcome<T>, LifecycleError> {
        let mut resolution = self.resolution.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(outcome) = resolution.as_ref() {
            return Ok(outcome.clone());
        }

        let outcome = self.resolve_parts(env)?;
        let result = match &outcome {
            Ok(Maybe::Defined(_)) => "set",
            Ok(Maybe::Undefined) => "undefined",
            Err(e) => e.kind(),
        };
        debug!(composite = %self.name, outcome = result, "resolved variable composite");

        *resolution = Some(outcome.clone());
        Ok(outcome)
    }

    fn resolve_parts(&self, env: &Environment) -> Result<Outcome<T>, LifecycleError> {
        let mut set = Vec::new();
        let mut unset = Vec::new();
        for variable in &self.variables {
            match variable.marshalled_value(env)? {
                Ok(Maybe::Defined(_)) => set.push(variable.name().to_string()),
                Ok(Maybe::Undefined) => unset.push(variable.name().to_string()),
                Err(e) => return Ok(Err(e)),
            }
        }

        if set.is_empty() {
            return Ok(Ok(Maybe::Undefined));
        }
        if !unset.is_empty() {
            return Ok(Err(PartialCompositeError { set, unset }.into()));
        }

        let value = match (self.resolve)(env) {
            Ok(value) => value,
            Err(ResolveError::Lifecycle(e)) => return Err(e),
            Err(ResolveError::Variable(e)) => return Ok(Err(e)),
        };

        if let Err(cause) = apply_constraints(&self.constraints, &value) {
            let parts = self
                .variables
                .iter()
                .map(|v| CompositePart {
                    name: v.name().to_string(),
                    is_sensitive: v.is_sensitive(),
                    raw: v.raw_value().unwrap_or_default(),
                })
                .collect();
            return Ok(Err(CompositeError { parts, cause }.into()));
        }

        Ok(Ok(Maybe::Defined(value)))
    }
}

impl<T> fmt::Debug for VariableComposite<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.variables.iter().map(|v| v.name()).collect();
        f.debug_struct("VariableComposite")
            .field("name", &self.name)
            .field("variables", &names)
            .field("is_required", &self.is_required)
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a composite, as held by the registry.
pub trait AnyComposite: Send + Sync {
    /// Name of the composite, e.g. a Kubernetes service name.
    fn name(&self) -> &str;

    /// Names of every constituent variable.
    fn variable_names(&self) -> Vec<String>;

    /// Resolve the composite and attribute any failure to its constituents.
    ///
    /// Errors that belong to a single constituent are not repeated here;
    /// that constituent already reports them.
    fn blame(&self, env: &Environment) -> Result<Vec<(String, VariableError)>, LifecycleError>;

    /// Forget the memoized resolution.
    fn reset(&self);
}

impl<T: Native> AnyComposite for VariableComposite<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name().to_string()).collect()
    }

    fn blame(&self, env: &Environment) -> Result<Vec<(String, VariableError)>, LifecycleError> {
        Ok(match self.resolution(env)? {
            Ok(Maybe::Undefined) if self.is_required => self
                .variables
                .iter()
                .map(|v| {
                    let name = v.name().to_string();
                    (name.clone(), VariableError::NotSet { name })
                })
                .collect(),
            Ok(_) => Vec::new(),
            Err(VariableError::PartialComposite(e)) => e.blame(),
            Err(VariableError::Composite(e)) => e.blame(),
            Err(_) => Vec::new(),
        })
    }

    fn reset(&self) {
        *self.resolution.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
