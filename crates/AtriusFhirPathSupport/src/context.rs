//! # Evaluation Context
//!
//! Composes the three values a FHIRPath evaluator needs before it sees any
//! expression: the default type namespace, the type registry and the function
//! table. The context is immutable once built and is meant to be shared by
//! every evaluation, typically behind an `Arc`.

use std::sync::Arc;

use atrius_fhir_types::{SYSTEM_NAMESPACE, TypeDescriptor, TypeRef, TypeRegistry};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ContextError;
use crate::function_table::{FunctionResult, FunctionTable};
use crate::type_info::{TypeInfo, TypeInfoResult};

#[derive(Debug, Clone)]
pub struct EvaluationContext {
    namespace: String,
    registry: Arc<TypeRegistry>,
    functions: Arc<FunctionTable>,
}

impl EvaluationContext {
    /// Builds a context with `namespace` as the default namespace for
    /// unqualified type names.
    ///
    /// Fails with [`ContextError::UnknownNamespace`] when the namespace is
    /// empty or the registry holds no types in it.
    pub fn new(
        namespace: impl Into<String>,
        registry: Arc<TypeRegistry>,
        functions: FunctionTable,
    ) -> Result<Self, ContextError> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() || !registry.has_namespace(&namespace) {
            return Err(ContextError::UnknownNamespace(namespace));
        }

        info!(
            "Evaluation context ready: namespace {}, {} types, {} functions",
            namespace,
            registry.len(),
            functions.len()
        );
        Ok(Self {
            namespace,
            registry,
            functions: Arc::new(functions),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Resolves a type specifier (`Patient`, `FHIR.Patient`, `System.String`).
    pub fn resolve_type(&self, specifier: &str) -> Result<&TypeDescriptor, ContextError> {
        self.registry
            .resolve_specifier(specifier, &self.namespace)
            .ok_or_else(|| ContextError::UnknownType(specifier.to_string()))
    }

    /// Reflection record for a type specifier.
    pub fn type_info(&self, specifier: &str) -> Result<TypeInfo, ContextError> {
        self.resolve_type(specifier).map(TypeInfo::from_descriptor)
    }

    /// The type of a JSON value as FHIRPath sees it.
    ///
    /// Objects carrying a `resourceType` are typed by the registry; JSON
    /// scalars map onto System types. Anything else has no known type.
    pub fn type_of(&self, value: &Value) -> Option<TypeInfoResult> {
        let type_ref = match value {
            Value::Bool(_) => TypeRef::system("Boolean"),
            Value::String(_) => TypeRef::system("String"),
            Value::Number(n) if n.is_i64() || n.is_u64() => TypeRef::system("Integer"),
            Value::Number(_) => TypeRef::system("Decimal"),
            Value::Object(_) => self
                .registry
                .resource_type_of(value, &self.namespace)?
                .type_ref(),
            Value::Array(_) | Value::Null => return None,
        };
        if !self.registry.contains(&type_ref) {
            debug!("{} is not part of the type registry", type_ref);
            return None;
        }
        Some(TypeInfoResult::from(&type_ref))
    }

    /// Whether a JSON value is an instance of the named type or one of its
    /// subtypes, as used by the `is` operator.
    pub fn is_instance_of(&self, value: &Value, specifier: &str) -> Result<bool, ContextError> {
        let target = self.resolve_type(specifier)?.type_ref();
        Ok(self
            .type_of(value)
            .is_some_and(|t| self.registry.is_subtype_of(&t.type_ref(), &target)))
    }

    /// Whether a namespace is known to the context.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        namespace == SYSTEM_NAMESPACE || self.registry.has_namespace(namespace)
    }

    /// Invokes a registered function.
    pub fn call(&self, name: &str, input: &[Value], args: &[Vec<Value>]) -> FunctionResult {
        self.functions.invoke(name, input, args)
    }
}
