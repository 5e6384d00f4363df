use serde::{Deserialize, Serialize};

use crate::element_definition::ElementDefinition;

/// Bootstrap representation of a FHIR StructureDefinition.
///
/// A StructureDefinition describes the structure of a FHIR data type or
/// resource. This version keeps the fields needed to derive a type descriptor:
///
/// - `type`: The type being defined (e.g., "Patient", "string")
/// - `kind`: "primitive-type", "complex-type", "resource" or "logical"
/// - `abstract`: Whether this is an abstract base type
/// - `base_definition`: Canonical URL of the parent type, absent for `Base`
/// - `derivation`: "specialization" for base types, "constraint" for profiles
/// - `snapshot`: The complete element list, including inherited elements
/// - `differential`: Only the elements introduced or changed by this definition
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StructureDefinition {
    pub url: String,
    pub name: String,
    #[serde(rename = "fhirVersion")]
    pub fhir_version: Option<String>,
    pub kind: String,
    #[serde(rename = "abstract", default)]
    pub r#abstract: bool,
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    #[serde(rename = "baseDefinition")]
    pub base_definition: Option<String>,
    pub derivation: Option<String>,
    pub snapshot: Option<StructureDefinitionSnapshotOrDifferential>,
    pub differential: Option<StructureDefinitionSnapshotOrDifferential>,
}

impl StructureDefinition {
    /// The name of the defined type: `type`, falling back to `name`.
    pub fn type_name(&self) -> &str {
        self.r#type.as_deref().unwrap_or(&self.name)
    }

    /// Profiles constrain an existing type instead of defining a new one.
    pub fn is_constraint(&self) -> bool {
        self.derivation.as_deref() == Some("constraint")
    }

    /// Snapshot elements when present, otherwise the differential.
    pub fn elements(&self) -> &[ElementDefinition] {
        self.snapshot
            .as_ref()
            .or(self.differential.as_ref())
            .and_then(|s| s.element.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StructureDefinitionSnapshotOrDifferential {
    pub element: Option<Vec<ElementDefinition>>,
}
