//! # Type Descriptors
//!
//! The records that make up the FHIRPath type table: one [`TypeDescriptor`] per
//! named type, each listing its base type and its elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format_helpers::capitalize_first_letter;

/// Namespace of the types defined by the FHIR specification.
pub const FHIR_NAMESPACE: &str = "FHIR";

/// Namespace of FHIRPath's own primitive types.
pub const SYSTEM_NAMESPACE: &str = "System";

/// Reference to a type by namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef {
    pub namespace: String,
    pub name: String,
}

impl TypeRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn fhir(name: impl Into<String>) -> Self {
        Self::new(FHIR_NAMESPACE, name)
    }

    pub fn system(name: impl Into<String>) -> Self {
        Self::new(SYSTEM_NAMESPACE, name)
    }

    /// The root of the hierarchy, `System.Any`.
    pub fn any() -> Self {
        Self::system("Any")
    }

    pub fn is_system(&self) -> bool {
        self.namespace == SYSTEM_NAMESPACE
    }

    /// Parses `Namespace.name`; a string without a dot has no namespace.
    pub fn parse_qualified(specifier: &str) -> (Option<&str>, &str) {
        match specifier.split_once('.') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                (Some(namespace), name)
            }
            _ => (None, specifier),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Classification of a descriptor, mirroring StructureDefinition.kind plus
/// the synthesized kinds used by this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    /// FHIRPath built-in type in the `System` namespace
    System,
    PrimitiveType,
    ComplexType,
    Resource,
    Logical,
    /// Inline element type synthesized from a backbone element path
    BackboneElement,
}

impl TypeKind {
    /// Maps a StructureDefinition `kind` code.
    pub fn from_structure_definition_kind(kind: &str) -> Option<Self> {
        match kind {
            "primitive-type" => Some(TypeKind::PrimitiveType),
            "complex-type" => Some(TypeKind::ComplexType),
            "resource" => Some(TypeKind::Resource),
            "logical" => Some(TypeKind::Logical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::System => "system",
            TypeKind::PrimitiveType => "primitive-type",
            TypeKind::ComplexType => "complex-type",
            TypeKind::Resource => "resource",
            TypeKind::Logical => "logical",
            TypeKind::BackboneElement => "backbone-element",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One direct property of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(rename = "isList")]
    pub is_list: bool,
    /// Base name of the choice element this entry was expanded from
    /// (`value` for `valueQuantity`).
    #[serde(rename = "choiceOf", default, skip_serializing_if = "Option::is_none")]
    pub choice_of: Option<String>,
}

impl ElementDescriptor {
    pub fn new(name: impl Into<String>, type_ref: TypeRef, is_list: bool) -> Self {
        Self {
            name: name.into(),
            type_ref,
            is_list,
            choice_of: None,
        }
    }

    pub fn choice(
        name: impl Into<String>,
        type_ref: TypeRef,
        is_list: bool,
        choice_of: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_ref,
            is_list,
            choice_of: Some(choice_of.into()),
        }
    }

    /// The element name with its first letter capitalized (`use` -> `Use`).
    pub fn exported_name(&self) -> String {
        capitalize_first_letter(&self.name)
    }
}

/// Describes one named type in the FHIR/FHIRPath type system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "baseType", default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRef>,
    pub kind: TypeKind,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementDescriptor>,
}

impl TypeDescriptor {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        base_type: Option<TypeRef>,
        kind: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            base_type,
            kind,
            is_abstract: false,
            url: None,
            elements: Vec::new(),
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(self.namespace.clone(), self.name.clone())
    }

    /// Looks up a directly declared element by name.
    pub fn element(&self, name: &str) -> Option<&ElementDescriptor> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// All expanded entries of the choice element `base_name`.
    pub fn choice_elements<'a, 'b>(
        &'a self,
        base_name: &'b str,
    ) -> impl Iterator<Item = &'a ElementDescriptor> + use<'a, 'b> {
        self.elements
            .iter()
            .filter(move |e| e.choice_of.as_deref() == Some(base_name))
    }

    pub fn is_resource(&self) -> bool {
        self.kind == TypeKind::Resource
    }
}
