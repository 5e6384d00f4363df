//! Error types for loading and validating the FHIR type table
//!
//! Every variant is fatal at load time: the registry is foundational state that
//! the FHIRPath evaluator assumes to be internally consistent.

use std::path::PathBuf;

use thiserror::Error;

use crate::descriptor::TypeRef;

/// Result type alias for type-table operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while reading schema sources or assembling the registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema source is not valid JSON or does not match the expected shape.
    #[error("Failed to parse schema source '{source_name}': {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A type table could not be written out as JSON.
    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// A descriptor's base type is not part of the same load.
    #[error("Base type {base} of {type_ref} does not resolve to a known type")]
    UnresolvedBase { type_ref: TypeRef, base: TypeRef },

    /// An element is typed with a type that is not part of the same load.
    #[error("Element '{element}' of {type_ref} refers to unknown type {target}")]
    UnresolvedElementType {
        type_ref: TypeRef,
        element: String,
        target: TypeRef,
    },

    /// Two descriptors declare the same (namespace, name) pair.
    #[error("Duplicate type definition: {0}")]
    DuplicateType(TypeRef),

    /// Walking the base chain from this type never reaches the root.
    #[error("Inheritance cycle detected starting at {0}")]
    InheritanceCycle(TypeRef),

    /// The table has no `System.Any` root.
    #[error("Type table has no root type System.Any")]
    MissingRoot,

    /// A StructureDefinition cannot be turned into a descriptor.
    #[error("Malformed StructureDefinition '{url}': {reason}")]
    MalformedDefinition { url: String, reason: String },

    /// The JSON document is neither a Bundle, a StructureDefinition nor a manifest.
    #[error("Unsupported schema source: {0}")]
    UnsupportedSource(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download failed: {0}")]
    Download(String),
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedDefinition {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
