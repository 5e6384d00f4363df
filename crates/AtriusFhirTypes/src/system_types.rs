//! # FHIRPath System Types
//!
//! The `System` namespace holds FHIRPath's built-in primitive types. They are
//! not described by any StructureDefinition, so the loader seeds them into
//! every table ahead of the FHIR types.

use once_cell::sync::Lazy;

use crate::descriptor::{SYSTEM_NAMESPACE, TypeDescriptor, TypeKind, TypeRef};

/// URL prefix used by StructureDefinitions to refer to System types
/// (`http://hl7.org/fhirpath/System.String`).
pub const FHIRPATH_SYSTEM_TYPE_PREFIX: &str = "http://hl7.org/fhirpath/System.";

/// Names of the System types in table order, root first.
pub const SYSTEM_TYPE_NAMES: &[&str] = &[
    "Any", "Boolean", "String", "Integer", "Long", "Decimal", "Date", "DateTime", "Time",
    "Quantity",
];

static SYSTEM_TYPES: Lazy<Vec<TypeDescriptor>> = Lazy::new(|| {
    SYSTEM_TYPE_NAMES
        .iter()
        .map(|name| {
            let base = if *name == "Any" {
                None
            } else {
                Some(TypeRef::any())
            };
            TypeDescriptor::new(SYSTEM_NAMESPACE, *name, base, TypeKind::System)
        })
        .collect()
});

/// Descriptors for the System namespace, `System.Any` first.
pub fn system_type_descriptors() -> Vec<TypeDescriptor> {
    SYSTEM_TYPES.clone()
}

/// Maps a `http://hl7.org/fhirpath/System.X` type code to `System.X`.
pub fn system_type_from_code(code: &str) -> Option<TypeRef> {
    code.strip_prefix(FHIRPATH_SYSTEM_TYPE_PREFIX)
        .filter(|name| !name.is_empty())
        .map(TypeRef::system)
}
