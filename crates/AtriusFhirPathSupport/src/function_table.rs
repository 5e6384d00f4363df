//! # FHIRPath Function Table
//!
//! Maps function names to their implementations. The evaluator consults the
//! table whenever it reaches a function-call node. Which built-in functions a
//! table holds is up to its owner; [`FunctionTable::default`] is empty.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ContextError, FunctionError};

/// Result of a function call: the output collection.
pub type FunctionResult = Result<Vec<Value>, FunctionError>;

/// A function body. Receives the input collection and one evaluated
/// collection per argument.
pub type FhirPathFunction = Arc<dyn Fn(&[Value], &[Vec<Value>]) -> FunctionResult + Send + Sync>;

/// A registered function with its accepted number of arguments.
#[derive(Clone)]
pub struct FunctionEntry {
    name: String,
    min_args: usize,
    max_args: Option<usize>,
    callable: FhirPathFunction,
}

impl FunctionEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_args(&self) -> usize {
        self.min_args
    }

    /// `None` when the function is variadic.
    pub fn max_args(&self) -> Option<usize> {
        self.max_args
    }

    pub fn accepts(&self, arg_count: usize) -> bool {
        arg_count >= self.min_args && self.max_args.is_none_or(|max| arg_count <= max)
    }

    /// Calls the function after checking the argument count.
    pub fn invoke(&self, input: &[Value], args: &[Vec<Value>]) -> FunctionResult {
        if !self.accepts(args.len()) {
            return Err(FunctionError::InvalidArity {
                name: self.name.clone(),
                min: self.min_args,
                max: self.max_args,
                got: args.len(),
            });
        }
        (self.callable)(input, args)
    }
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

/// Name-keyed table of function implementations. Lookup is case-sensitive.
///
/// ```rust
/// use atrius_fhirpath_support::FunctionTable;
/// use serde_json::json;
///
/// let mut functions = FunctionTable::new();
/// functions
///     .register("count", 0, Some(0), |input, _| Ok(vec![json!(input.len())]))
///     .unwrap();
///
/// let result = functions.invoke("count", &[json!("a"), json!("b")], &[]).unwrap();
/// assert_eq!(result, vec![json!(2)]);
/// ```
#[derive(Clone, Default, Debug)]
pub struct FunctionTable {
    entries: BTreeMap<String, FunctionEntry>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callable` under `name`. A name can only be registered once.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        min_args: usize,
        max_args: Option<usize>,
        callable: F,
    ) -> Result<(), ContextError>
    where
        F: Fn(&[Value], &[Vec<Value>]) -> FunctionResult + Send + Sync + 'static,
    {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(ContextError::DuplicateFunction(name));
        }
        let entry = FunctionEntry {
            name: name.clone(),
            min_args,
            max_args,
            callable: Arc::new(callable),
        };
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn invoke(&self, name: &str, input: &[Value], args: &[Vec<Value>]) -> FunctionResult {
        self.get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?
            .invoke(input, args)
    }
}
