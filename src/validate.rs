//! The validation pass.
//!
//! [`validate`] resolves every registered variable in registration order and
//! captures each outcome, so one invalid variable never hides another. After
//! the variables, each composite is resolved and its failures are attributed
//! to the constituents it blames.
//!
//! Errors are accumulated with stillwater's `Validation`, the same way
//! [`apply_constraints`](crate::constraint::apply_constraints) accumulates
//! constraint violations for a single value.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use stillwater::Validation;
use tracing::debug;

use crate::composite::AnyComposite;
use crate::environment::Environment;
use crate::error::{
    EnvValidation, LifecycleError, VariableError, VariableErrors, SENSITIVE_PLACEHOLDER,
};
use crate::maybe::Maybe;
use crate::variable::AnyVariable;

/// The outcome of resolving one variable.
#[derive(Clone)]
pub struct VariableResult {
    /// The variable that was resolved
    pub variable: Arc<dyn AnyVariable>,
    /// The marshalled value, or why it could not be resolved
    pub result: Result<Maybe<String>, VariableError>,
}

impl VariableResult {
    /// The marshalled value for display, redacted when sensitive.
    pub fn display_value(&self) -> Option<&str> {
        match &self.result {
            Ok(Maybe::Defined(_)) if self.variable.is_sensitive() => Some(SENSITIVE_PLACEHOLDER),
            Ok(Maybe::Defined(value)) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for VariableResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableResult")
            .field("variable", &self.variable.name())
            .field("value", &self.display_value())
            .field("error", &self.result.as_ref().err())
            .finish()
    }
}

/// Results of a validation pass.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// True when every variable resolved
    pub is_valid: bool,
    /// One result per registered variable, in registration order
    pub results: Vec<VariableResult>,
}

#[derive(Serialize)]
struct ResultSummary<'a> {
    name: &'a str,
    description: &'a str,
    is_sensitive: bool,
    schema: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ValidationReport {
    /// Number of invalid variables.
    pub fn invalid_count(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_err()).count()
    }

    /// Accumulate every error, in registration order.
    pub fn into_validation(&self) -> EnvValidation<()> {
        if self.results.is_empty() {
            return Validation::Success(());
        }

        let validations: Vec<EnvValidation<()>> = self
            .results
            .iter()
            .map(|r| match &r.result {
                Ok(_) => Validation::Success(()),
                Err(e) => Validation::Failure(VariableErrors::single(e.clone())),
            })
            .collect();
        Validation::all_vec(validations).map(|_| ())
    }

    /// Every error, or `None` when the environment is valid.
    pub fn errors(&self) -> Option<VariableErrors> {
        match self.into_validation() {
            Validation::Success(()) => None,
            Validation::Failure(errors) => Some(errors),
        }
    }

    /// Serialize the results as JSON, with sensitive values redacted.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let summaries: Vec<ResultSummary<'_>> = self
            .results
            .iter()
            .map(|r| ResultSummary {
                name: r.variable.name(),
                description: r.variable.description(),
                is_sensitive: r.variable.is_sensitive(),
                schema: r.variable.expected(),
                outcome: if r.result.is_ok() { "valid" } else { "invalid" },
                value: r.display_value(),
                error: r.result.as_ref().err().map(ToString::to_string),
            })
            .collect();
        serde_json::to_string_pretty(&summaries)
    }
}

/// Resolve every variable and composite, capturing every outcome.
///
/// # Errors
///
/// Returns `LifecycleError::Uninitialized` when the environment has not been
/// initialized; resolution errors never escape this function.
pub fn validate(
    env: &Environment,
    variables: &[Arc<dyn AnyVariable>],
    composites: &[Arc<dyn AnyComposite>],
) -> Result<ValidationReport, LifecycleError> {
    let mut results = Vec::with_capacity(variables.len());
    for variable in variables {
        results.push(VariableResult {
            variable: Arc::clone(variable),
            result: variable.marshalled_value(env)?,
        });
    }

    for composite in composites {
        for (name, error) in composite.blame(env)? {
            let blamed = results
                .iter_mut()
                .find(|r| r.variable.name() == name && r.result.is_ok());
            if let Some(result) = blamed {
                result.result = Err(error);
            }
        }
    }

    let report = ValidationReport {
        is_valid: results.iter().all(|r| r.result.is_ok()),
        results,
    };
    debug!(
        variables = report.results.len(),
        invalid = report.invalid_count(),
        "validated environment"
    );
    Ok(report)
}
