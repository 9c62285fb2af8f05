//! The environment registry.
//!
//! An [`Environment`] is the context every declaration is registered with.
//! It enforces a two-phase lifecycle:
//!
//! - **Declaring**: variables may be registered, but not read.
//! - **Initialized**: variables may be read, but no longer registered.
//!
//! `initialize()` moves from the first phase to the second and runs the
//! validation pass over every registered variable.
//!
//! # Example
//!
//! ```ignore
//! use envspec::prelude::*;
//!
//! let env = Environment::new();
//! let weight = integer(&env, "WEIGHT", "weight of the thing").min(1).declare()?;
//!
//! env.initialize()?;  // prints a summary and exits if anything is invalid
//!
//! println!("weight: {}", weight.value()?);
//! ```

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::composite::AnyComposite;
use crate::env::{EnvSource, RealEnv};
use crate::error::{Error, LifecycleError, SpecificationError};
use crate::pretty::{render_summary, SummaryOptions};
use crate::validate::{validate, ValidationReport, VariableResult};
use crate::variable::AnyVariable;

#[derive(Default)]
struct RegistryState {
    variables: Vec<Arc<dyn AnyVariable>>,
    composites: Vec<Arc<dyn AnyComposite>>,
    initialized: bool,
}

struct Registry {
    source: Box<dyn EnvSource>,
    state: RwLock<RegistryState>,
}

/// Registry of declared variables with a declare-then-read lifecycle.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct Environment {
    inner: Arc<Registry>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment backed by the process environment.
    pub fn new() -> Self {
        Self::with_source(RealEnv::new())
    }

    /// Create an environment backed by a custom source.
    ///
    /// This enables dependency injection for testing.
    pub fn with_source(source: impl EnvSource + 'static) -> Self {
        Self {
            inner: Arc::new(Registry {
                source: Box::new(source),
                state: RwLock::new(RegistryState::default()),
            }),
        }
    }

    fn state(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a variable.
    ///
    /// # Errors
    ///
    /// - `Error::Lifecycle` if the environment is already initialized
    /// - `Error::Specification` if a variable with the same name exists
    pub fn register(&self, variable: Arc<dyn AnyVariable>) -> Result<(), Error> {
        self.register_all(vec![variable])
    }

    /// Register several variables at once. Either all are registered or,
    /// on error, none are.
    pub fn register_all(&self, variables: Vec<Arc<dyn AnyVariable>>) -> Result<(), Error> {
        let mut state = self.state_mut();

        if let (true, Some(first)) = (state.initialized, variables.first()) {
            return Err(LifecycleError::Finalized {
                name: first.name().to_string(),
            }
            .into());
        }
        for (i, variable) in variables.iter().enumerate() {
            let name = variable.name();
            let declared = state.variables.iter().chain(&variables[..i]);
            if declared.map(|v| v.name()).any(|n| n == name) {
                return Err(SpecificationError::new(name, "variable is already declared").into());
            }
        }

        for variable in variables {
            debug!(variable = %variable.name(), "registered environment variable");
            state.variables.push(variable);
        }
        Ok(())
    }

    /// Register a composite over already-registered variables.
    pub fn register_composite(&self, composite: Arc<dyn AnyComposite>) -> Result<(), Error> {
        let mut state = self.state_mut();
        if state.initialized {
            return Err(LifecycleError::Finalized {
                name: composite.name().to_string(),
            }
            .into());
        }

        debug!(composite = %composite.name(), "registered variable composite");
        state.composites.push(composite);
        Ok(())
    }

    /// Read the raw value of a variable.
    ///
    /// An unset variable reads as the empty string.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Uninitialized` before `initialize()`.
    pub fn read(&self, name: &str) -> Result<String, LifecycleError> {
        if !self.state().initialized {
            return Err(LifecycleError::Uninitialized {
                name: name.to_string(),
            });
        }
        Ok(self.inner.source.get_env(name).unwrap_or_default())
    }

    /// Check if `initialize()` has been called.
    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub(crate) fn mark_initialized(&self) {
        self.state_mut().initialized = true;
        debug!("environment initialized");
    }

    /// Snapshot of registered variables, in registration order.
    pub fn variables(&self) -> Vec<Arc<dyn AnyVariable>> {
        self.state().variables.clone()
    }

    /// Run the validation pass over every registered variable.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Uninitialized` before `initialize()`.
    pub fn validate(&self) -> Result<ValidationReport, LifecycleError> {
        let (variables, composites) = {
            let state = self.state();
            (state.variables.clone(), state.composites.clone())
        };
        validate(self, &variables, &composites)
    }

    /// Initialize the environment and validate every variable.
    ///
    /// If any variable is invalid, a summary of every variable is printed to
    /// stderr and the process exits with status 1.
    pub fn initialize(&self) -> Result<(), Error> {
        self.initialize_with(|invalid| invalid.default_handler())
    }

    /// Initialize the environment, handing an invalid result to `on_invalid`.
    ///
    /// `on_invalid` may inspect the results and fall back to
    /// [`InvalidEnvironment::default_handler`].
    pub fn initialize_with<F>(&self, on_invalid: F) -> Result<(), Error>
    where
        F: FnOnce(InvalidEnvironment<'_>),
    {
        let report = self.run_initialization()?;
        if !report.is_valid {
            on_invalid(InvalidEnvironment {
                results: &report.results,
            });
        }
        Ok(())
    }

    /// Initialize the environment, returning every error instead of exiting.
    ///
    /// # Errors
    ///
    /// Returns `Error::Invalid` with every variable error when the
    /// environment is invalid.
    pub fn try_initialize(&self) -> Result<ValidationReport, Error> {
        let report = self.run_initialization()?;
        match report.errors() {
            Some(errors) => Err(Error::Invalid(errors)),
            None => Ok(report),
        }
    }

    fn run_initialization(&self) -> Result<ValidationReport, Error> {
        self.mark_initialized();
        let report = self.validate()?;
        if !report.is_valid {
            warn!(
                variables = report.results.len(),
                invalid = report.invalid_count(),
                "environment is invalid"
            );
        }
        Ok(report)
    }

    /// Clear every registration, memoized resolution, and the initialized flag.
    ///
    /// Declarations made before the reset keep working only after they are
    /// re-declared against this environment and it is initialized again.
    pub fn reset(&self) {
        let previous = std::mem::take(&mut *self.state_mut());
        for variable in &previous.variables {
            variable.reset();
        }
        for composite in &previous.composites {
            composite.reset();
        }
        debug!("environment reset");
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        let names: Vec<&str> = state.variables.iter().map(|v| v.name()).collect();
        f.debug_struct("Environment")
            .field("variables", &names)
            .field("initialized", &state.initialized)
            .finish()
    }
}

/// Arguments handed to an `on_invalid` handler.
pub struct InvalidEnvironment<'a> {
    /// One result per registered variable, in registration order
    pub results: &'a [VariableResult],
}

impl InvalidEnvironment<'_> {
    /// Render a summary of every variable to a string.
    pub fn summary(&self, options: &SummaryOptions) -> String {
        render_summary(self.results, options)
    }

    /// Print a summary to stderr and exit with status 1.
    pub fn default_handler(&self) -> ! {
        eprintln!("{}", self.summary(&SummaryOptions::default()));
        std::process::exit(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::{boolean, integer, string};
    use crate::env::MockEnv;

    #[test]
    fn test_read_before_initialize_fails() {
        let env = Environment::with_source(MockEnv::new().with_env("A", "1"));
        assert_eq!(
            env.read("A"),
            Err(LifecycleError::Uninitialized {
                name: "A".to_string()
            })
        );
    }

    #[test]
    fn test_read_absent_is_empty() {
        let env = Environment::with_source(MockEnv::new().with_env("A", "1"));
        env.mark_initialized();
        assert_eq!(env.read("A").unwrap(), "1");
        assert_eq!(env.read("B").unwrap(), "");
    }

    #[test]
    fn test_register_after_initialize_fails() {
        let env = Environment::with_source(MockEnv::new());
        env.try_initialize().unwrap();

        let err = integer(&env, "LATE", "declared too late").declare().unwrap_err();
        assert!(matches!(
            err,
            Error::Lifecycle(LifecycleError::Finalized { .. })
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let env = Environment::with_source(MockEnv::new());
        string(&env, "NAME", "first").declare().unwrap();
        let err = string(&env, "NAME", "second").declare().unwrap_err();
        assert_eq!(
            err.to_string(),
            "specification for NAME is invalid: variable is already declared"
        );
    }

    #[test]
    fn test_try_initialize_collects_every_error() {
        let env = Environment::with_source(
            MockEnv::new()
                .with_env("FIRST", "x")
                .with_env("SECOND", "true"),
        );
        integer(&env, "FIRST", "first").declare().unwrap();
        boolean(&env, "SECOND", "second").declare().unwrap();
        integer(&env, "THIRD", "third").declare().unwrap();

        let Err(Error::Invalid(errors)) = env.try_initialize() else {
            panic!("expected an invalid environment");
        };
        assert_eq!(errors.len(), 2);
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "value of FIRST (\"x\") is invalid: must be an integer".to_string(),
                "THIRD is undefined and does not have a default value".to_string(),
            ]
        );
    }

    #[test]
    fn test_initialize_with_receives_results() {
        let env = Environment::with_source(MockEnv::new().with_env("A", "x"));
        integer(&env, "A", "a").declare().unwrap();
        string(&env, "B", "b").default("b").declare().unwrap();

        let mut seen = Vec::new();
        env.initialize_with(|invalid| {
            seen = invalid
                .results
                .iter()
                .map(|r| (r.variable.name().to_string(), r.result.is_ok()))
                .collect();
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![("A".to_string(), false), ("B".to_string(), true)]
        );
    }

    #[test]
    fn test_initialize_with_not_called_when_valid() {
        let env = Environment::with_source(MockEnv::new().with_env("A", "1"));
        integer(&env, "A", "a").declare().unwrap();

        let mut called = false;
        env.initialize_with(|_| called = true).unwrap();
        assert!(!called);
        assert!(env.is_initialized());
    }

    #[test]
    fn test_reset_allows_redeclaring() {
        let env = Environment::with_source(MockEnv::new().with_env("A", "1"));
        integer(&env, "A", "a").declare().unwrap();
        env.try_initialize().unwrap();

        env.reset();
        assert!(!env.is_initialized());
        assert!(env.variables().is_empty());

        let a = integer(&env, "A", "a").declare().unwrap();
        env.try_initialize().unwrap();
        assert_eq!(a.value().unwrap(), 1);
    }
}
