use serde::{Deserialize, Serialize};

use crate::structure_definition::StructureDefinition;

/// Bootstrap representation of a FHIR Bundle.
///
/// The official FHIR specification ships its definitions as collection Bundles
/// (`profiles-types.json`, `profiles-resources.json`). The loader extracts the
/// StructureDefinitions from the entries; other resources are skipped.
#[derive(Debug, Serialize, Deserialize)]
pub struct Bundle {
    pub entry: Option<Vec<BundleEntry>>,
}

impl Bundle {
    /// All StructureDefinitions in entry order, including those of nested bundles.
    pub fn structure_definitions(self) -> Vec<StructureDefinition> {
        let mut definitions = Vec::new();
        for entry in self.entry.unwrap_or_default() {
            match entry.resource {
                Some(BundleResource::StructureDefinition(sd)) => definitions.push(*sd),
                Some(BundleResource::Bundle(nested)) => {
                    definitions.extend(nested.structure_definitions())
                }
                Some(BundleResource::Other) | None => {}
            }
        }
        definitions
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BundleEntry {
    pub resource: Option<BundleResource>,
}

/// Resources that can appear in a definitions Bundle, routed on `resourceType`.
///
/// Only the types relevant to the type table get their own variant; search
/// parameters, operation definitions and the like fall into `Other`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum BundleResource {
    StructureDefinition(Box<StructureDefinition>),
    Bundle(Bundle),
    #[serde(other)]
    Other,
}
