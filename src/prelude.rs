//! Convenient re-exports for common envspec usage.
//!
//! # Quick Start
//!
//! ```ignore
//! use envspec::prelude::*;
//!
//! fn main() -> Result<(), Error> {
//!     let env = Environment::new();
//!
//!     let weight = integer(&env, "WEIGHT", "weight of the thing")
//!         .min(1)
//!         .declare()?;
//!     let debug = boolean(&env, "DEBUG", "enable debug output")
//!         .literals(["y"], ["n"])
//!         .default(false)
//!         .declare()?;
//!     let redis = kubernetes_address(&env, "redis-primary", "Redis primary")
//!         .declare_optional()?;
//!
//!     env.initialize()?;
//!
//!     println!("weight={} debug={} redis={:?}", weight.value()?, debug.value()?, redis.value()?);
//!     Ok(())
//! }
//! ```

// ============================================================================
// Stillwater re-exports (core functional programming types)
// ============================================================================

/// Result type with error accumulation. The validation pass combines every
/// variable's outcome with `Validation::all_vec`.
pub use stillwater::Validation;

/// Trait for combining values. `VariableErrors` implements this for error accumulation.
pub use stillwater::Semigroup;

/// Guaranteed non-empty collection. Underlying type for `VariableErrors`.
pub use stillwater::NonEmptyVec;

// ============================================================================
// Error types
// ============================================================================

/// Any error returned by the public API.
pub use crate::error::Error;

/// Why a single variable could not be resolved.
pub use crate::error::VariableError;

/// Non-empty collection of variable errors. Implements `Semigroup`.
pub use crate::error::VariableErrors;

/// Type alias: `Validation<T, VariableErrors>`.
pub use crate::error::EnvValidation;

/// A declaration is invalid.
pub use crate::error::SpecificationError;

/// The environment was used out of order.
pub use crate::error::LifecycleError;

// ============================================================================
// Environment
// ============================================================================

/// Registry of declared variables.
pub use crate::environment::Environment;

/// Results handed to an `initialize_with` handler.
pub use crate::environment::InvalidEnvironment;

/// Results of a validation pass.
pub use crate::validate::{ValidationReport, VariableResult};

/// Trait for reading raw values. Implement for custom sources.
pub use crate::env::EnvSource;

/// Process environment, for production use.
pub use crate::env::RealEnv;

/// In-memory environment, for tests.
pub use crate::env::MockEnv;

// ============================================================================
// Declarations
// ============================================================================

/// Declaration handles and the generic builder.
pub use crate::declaration::{Declaration, DeclarationBuilder, OptionalDeclaration};

/// Declaration factories.
pub use crate::declarations::{
    big_integer, binary, boolean, duration, enumeration, integer, kubernetes_address,
    network_port_number, number, string, url,
};

/// Value types produced by declarations.
pub use crate::declarations::{BinaryEncoding, KubernetesAddress};

/// Three-state value: undefined, defined as absent, or defined.
pub use crate::maybe::Maybe;

// ============================================================================
// Pretty printing
// ============================================================================

/// Options for rendering a summary.
pub use crate::pretty::{ColorOption, SummaryOptions};
