//! # FHIRPath Type Information
//!
//! Provides type metadata for FHIRPath's `type()` function and reflection.
//! [`TypeInfoResult`] names a type; [`TypeInfo`] is the reflection record
//! built from a registry descriptor, following the FHIRPath reflection model:
//! System types become `SimpleTypeInfo`, everything else `ClassInfo`.

use atrius_fhir_types::{TypeDescriptor, TypeKind, TypeRef};
use serde::Serialize;

/// Type information result for FHIRPath type() function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeInfoResult {
    pub namespace: String,
    pub name: String,
}

impl TypeInfoResult {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(self.namespace.clone(), self.name.clone())
    }
}

impl From<&TypeRef> for TypeInfoResult {
    fn from(type_ref: &TypeRef) -> Self {
        Self::new(&type_ref.namespace, &type_ref.name)
    }
}

/// Reflection record for a primitive System type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleTypeInfo {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "baseType", skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfoElement {
    pub name: String,
    /// Qualified type specifier, `List<...>` for repeating elements
    #[serde(rename = "type")]
    pub type_specifier: String,
    #[serde(rename = "isOneBased")]
    pub is_one_based: bool,
}

/// Reflection record for a FHIR class type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "baseType", skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    pub element: Vec<ClassInfoElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypeInfo {
    Simple(SimpleTypeInfo),
    Class(ClassInfo),
}

impl TypeInfo {
    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Self {
        let base_type = descriptor.base_type.as_ref().map(TypeRef::to_string);
        if descriptor.kind == TypeKind::System {
            return TypeInfo::Simple(SimpleTypeInfo {
                namespace: descriptor.namespace.clone(),
                name: descriptor.name.clone(),
                base_type,
            });
        }

        let element = descriptor
            .elements
            .iter()
            .map(|e| ClassInfoElement {
                name: e.name.clone(),
                type_specifier: if e.is_list {
                    format!("List<{}>", e.type_ref)
                } else {
                    e.type_ref.to_string()
                },
                is_one_based: false,
            })
            .collect();

        TypeInfo::Class(ClassInfo {
            namespace: descriptor.namespace.clone(),
            name: descriptor.name.clone(),
            base_type,
            element,
        })
    }

    pub fn namespace(&self) -> &str {
        match self {
            TypeInfo::Simple(info) => &info.namespace,
            TypeInfo::Class(info) => &info.namespace,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeInfo::Simple(info) => &info.name,
            TypeInfo::Class(info) => &info.name,
        }
    }
}
