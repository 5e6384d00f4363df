//! # FHIR Type Table
//!
//! This crate builds the catalogue of types a FHIRPath evaluator reasons about:
//! the `System` primitives (`System.Any`, `System.String`, ...) and every FHIR
//! type and resource (`FHIR.Patient`, `FHIR.HumanName`, ...), each with its base
//! type and its elements.
//!
//! ## Overview
//!
//! Types are derived from the official FHIR StructureDefinitions rather than
//! spelled out in code:
//!
//! 1. **Loading**: [`RegistryLoader`] reads `profiles-types.json` /
//!    `profiles-resources.json` bundles, single StructureDefinitions, or a
//!    compact [`TypeManifest`]
//! 2. **Derivation**: [`TypeTableBuilder`] turns each StructureDefinition into
//!    [`TypeDescriptor`]s, expanding choice elements and naming backbone
//!    elements (`Patient.contact` → `PatientContact`)
//! 3. **Validation**: [`TypeRegistry`] rejects duplicates, dangling references
//!    and inheritance cycles, then answers lookups and subtype queries
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use atrius_fhir_types::{LoaderOptions, TypeRef, load_paths};
//!
//! let registry = Arc::new(load_paths(
//!     &["definitions/profiles-types.json", "definitions/profiles-resources.json"],
//!     LoaderOptions::default(),
//! )?);
//!
//! let patient = TypeRef::fhir("Patient");
//! assert!(registry.is_subtype_of(&patient, &TypeRef::fhir("DomainResource")));
//! assert!(registry.element(&patient, "name").is_some_and(|e| e.is_list));
//! # Ok::<(), atrius_fhir_types::SchemaError>(())
//! ```

pub mod builder;
pub mod bundle;
pub mod descriptor;
pub mod element_definition;
pub mod error;
#[cfg(feature = "download")]
pub mod fetch;
pub mod fhir_version;
pub mod format_helpers;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod structure_definition;
pub mod system_types;

pub use builder::{TypeTableBuilder, structure_definition_to_descriptors};
pub use descriptor::{
    ElementDescriptor, FHIR_NAMESPACE, SYSTEM_NAMESPACE, TypeDescriptor, TypeKind, TypeRef,
};
pub use error::{SchemaError, SchemaResult};
#[cfg(feature = "download")]
pub use fetch::fetch_definitions;
pub use fhir_version::FhirVersion;
pub use loader::{
    LoaderOptions, RegistryLoader, SchemaSource, load_dir, load_file, load_paths, load_str,
};
pub use manifest::TypeManifest;
pub use registry::TypeRegistry;
pub use structure_definition::StructureDefinition;
pub use system_types::system_type_descriptors;
