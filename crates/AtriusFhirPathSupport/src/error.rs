//! Errors raised while composing an evaluation context and calling functions.

use thiserror::Error;

/// Errors raised by [`EvaluationContext`](crate::EvaluationContext) construction
/// and its type lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The default namespace is empty or has no types in the registry.
    #[error("Unknown namespace '{0}': the type registry defines no types in it")]
    UnknownNamespace(String),

    #[error("Function '{0}' is already registered")]
    DuplicateFunction(String),

    /// A type specifier did not resolve against the registry.
    #[error("Unknown type '{0}'")]
    UnknownType(String),
}

/// Errors raised while invoking a registered function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Function '{name}' expects {} argument(s), got {got}", arity_range(.min, .max))]
    InvalidArity {
        name: String,
        min: usize,
        max: Option<usize>,
        got: usize,
    },

    /// Raised by the function body itself.
    #[error("Evaluation Error: {0}")]
    Evaluation(String),
}

fn arity_range(min: &usize, max: &Option<usize>) -> String {
    match max {
        Some(max) if max == min => min.to_string(),
        Some(max) => format!("{} to {}", min, max),
        None => format!("at least {}", min),
    }
}
