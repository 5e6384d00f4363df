//! # FHIRPath Support Types
//!
//! This crate provides the pieces a FHIRPath evaluator is handed before it
//! evaluates anything: the evaluation context that ties together the default
//! type namespace, the FHIR type registry and the function table, plus the
//! reflection records behind `type()`.
//!
//! ## Core Types
//!
//! - [`EvaluationContext`] - Immutable composition of namespace, registry and functions
//! - [`FunctionTable`] - Name-keyed function implementations with arity checks
//! - [`TypeInfo`] / [`TypeInfoResult`] - FHIRPath reflection records
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use atrius_fhir_types::{LoaderOptions, load_paths};
//! use atrius_fhirpath_support::{EvaluationContext, FunctionTable};
//!
//! let registry = Arc::new(load_paths(&["definitions/R5"], LoaderOptions::default())?);
//! let context = EvaluationContext::new("FHIR", registry, FunctionTable::default())?;
//!
//! assert_eq!(context.resolve_type("Patient")?.name, "Patient");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod context;
pub mod error;
pub mod function_table;
pub mod type_info;

pub use context::EvaluationContext;
pub use error::{ContextError, FunctionError};
pub use function_table::{FhirPathFunction, FunctionEntry, FunctionResult, FunctionTable};
pub use type_info::{ClassInfo, ClassInfoElement, SimpleTypeInfo, TypeInfo, TypeInfoResult};
