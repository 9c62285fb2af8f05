// Allow large error types - variable errors carry names, raw values and causes
#![allow(clippy::result_large_err)]

//! Envspec: declare typed environment variables and validate all of them up front.
//!
//! An application declares every environment variable it reads, with a type,
//! a description, optional constraints and examples. Initializing the
//! environment resolves every declaration at once, so a misconfigured process
//! reports ALL of its problems before it starts doing work, not just the first
//! one it happens to read.
//!
//! # Core Concepts
//!
//! - **Declarations**: typed factories (`integer`, `duration`, `url`, ...) that
//!   build a [`Variable`] and register it with an [`Environment`]
//! - **Lifecycle**: variables are declared first and read only after
//!   `initialize()`
//! - **Error Accumulation**: the validation pass collects every error with
//!   stillwater's `Validation`
//! - **Sensitive values**: redacted from every error message and summary
//! - **Testable I/O**: dependency injection via the [`EnvSource`] trait
//!
//! # Quick Start
//!
//! ```ignore
//! use envspec::prelude::*;
//!
//! fn main() -> Result<(), Error> {
//!     let env = Environment::new();
//!     let port = network_port_number(&env, "PORT", "port to listen on")
//!         .default(8080u16)
//!         .declare()?;
//!     let timeout = duration(&env, "TIMEOUT", "request timeout").declare()?;
//!
//!     env.initialize()?;
//!
//!     println!("listening on {} with timeout {:?}", port.value()?, timeout.value()?);
//!     Ok(())
//! }
//! ```
//!
//! # Import Patterns
//!
//! For most users, import the prelude:
//!
//! ```ignore
//! use envspec::prelude::*;
//! ```
//!
//! Or import only what you need:
//!
//! ```ignore
//! use envspec::{Environment, Error};
//! use envspec::declarations::integer;
//! ```

pub mod composite;
pub mod constraint;
pub mod declaration;
pub mod declarations;
pub mod env;
pub mod environment;
pub mod error;
pub mod example;
pub mod maybe;
pub mod prelude;
pub mod pretty;
pub mod schema;
pub mod validate;
pub mod variable;
mod words;

// Re-export main types at crate root
pub use composite::{AnyComposite, VariableComposite};
pub use constraint::{apply_constraints, Constraint, ConstraintsError};
pub use declaration::{Declaration, DeclarationBuilder, DeclarationKind, OptionalDeclaration};
pub use env::{EnvSource, MockEnv, RealEnv};
pub use environment::{Environment, InvalidEnvironment};
pub use error::{
    CompositeError, EnvValidation, Error, LifecycleError, PartialCompositeError, ResolveError,
    SpecificationError, ValueCause, ValueError, VariableError, VariableErrors,
    SENSITIVE_PLACEHOLDER,
};
pub use example::Example;
pub use maybe::{defined_value, undefined_value, Maybe};
pub use pretty::{render_summary, ColorOption, SummaryOptions};
pub use schema::{EnumMember, Native, Schema};
pub use validate::{ValidationReport, VariableResult};
pub use variable::{AnyVariable, Variable, VariableSpec};

// Re-export stillwater types for error accumulation
pub use stillwater::{NonEmptyVec, Semigroup, Validation};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::{integer, string};

    #[test]
    fn test_crate_root_exports() {
        let env = Environment::with_source(MockEnv::new().with_env("NAME", "envspec"));
        let name = string(&env, "NAME", "name").declare().unwrap();
        let level = integer(&env, "LEVEL", "level").default(3).declare().unwrap();

        let report: ValidationReport = env.try_initialize().unwrap();
        assert!(report.is_valid);
        assert_eq!(name.value().unwrap(), "envspec");
        assert_eq!(level.value().unwrap(), 3);
    }

    #[test]
    fn test_stillwater_reexports_accumulate() {
        let a: EnvValidation<()> = Validation::Failure(VariableErrors::single(
            VariableError::NotSet {
                name: "A".to_string(),
            },
        ));
        let b: EnvValidation<()> = Validation::Failure(VariableErrors::single(
            VariableError::NotSet {
                name: "B".to_string(),
            },
        ));
        match Validation::all_vec(vec![a, b]) {
            Validation::Failure(errors) => assert_eq!(errors.len(), 2),
            Validation::Success(_) => panic!("expected failure"),
        }
    }
}
