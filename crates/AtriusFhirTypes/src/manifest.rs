//! # Type Manifest
//!
//! Compact JSON form of a type table. A manifest exported from a registry can
//! be versioned alongside an application and loaded back without the much
//! larger StructureDefinition bundles.

use serde::{Deserialize, Serialize};

use crate::descriptor::{FHIR_NAMESPACE, TypeDescriptor, TypeKind};
use crate::error::{SchemaError, SchemaResult};
use crate::fhir_version::FhirVersion;
use crate::registry::TypeRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeManifest {
    #[serde(rename = "fhirVersion", default, skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<FhirVersion>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub types: Vec<TypeDescriptor>,
}

fn default_namespace() -> String {
    FHIR_NAMESPACE.to_string()
}

impl TypeManifest {
    /// Exports the non-System part of a registry. System types are seeded by
    /// every loader and need not be stored.
    pub fn from_registry(registry: &TypeRegistry, namespace: impl Into<String>) -> Self {
        Self {
            fhir_version: registry.fhir_version(),
            namespace: namespace.into(),
            types: registry
                .iter()
                .filter(|d| d.kind != TypeKind::System)
                .cloned()
                .collect(),
        }
    }

    pub fn from_json_str(source_name: &str, json: &str) -> SchemaResult<Self> {
        serde_json::from_str(json).map_err(|source| SchemaError::Parse {
            source_name: source_name.to_string(),
            source,
        })
    }

    pub fn to_json_string(&self) -> SchemaResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| SchemaError::Serialize {
            what: format!("manifest of {} types", self.types.len()),
            source,
        })
    }

    pub fn into_descriptors(self) -> Vec<TypeDescriptor> {
        self.types
    }
}
