use serde::{Deserialize, Serialize};

/// Canonical URL of the extension that records the FHIR type of an element
/// whose type code is a FHIRPath System type.
pub const FHIR_TYPE_EXTENSION_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/structuredefinition-fhir-type";

/// Bootstrap representation of a FHIR ElementDefinition.
///
/// Only the parts the type-table builder reads are modelled; everything else in
/// the published definitions (bindings, constraints, mappings, ...) is ignored
/// during deserialization.
///
/// ## Key Fields
///
/// - `path`: The full path to this element (e.g., "Patient.name.given")
/// - `type`: The data type(s) this element can contain
/// - `max`: Upper cardinality bound, `"*"` for repeating elements
/// - `content_reference`: Reference to another element definition whose
///   children this element reuses
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ElementDefinition {
    pub id: Option<String>,
    pub path: String,
    #[serde(rename = "sliceName")]
    pub slice_name: Option<String>,
    pub max: Option<String>,
    #[serde(rename = "contentReference")]
    pub content_reference: Option<String>,
    #[serde(rename = "type")]
    pub r#type: Option<Vec<ElementDefinitionType>>,
}

impl ElementDefinition {
    /// Whether the element may repeat (`max` is `*` or greater than one).
    pub fn is_list(&self) -> bool {
        match self.max.as_deref() {
            Some("*") => true,
            Some(max) => max.parse::<u32>().is_ok_and(|n| n > 1),
            None => false,
        }
    }

    /// The last path segment (`Patient.name` → `name`).
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Number of dots in the path; the root element has depth 0.
    pub fn depth(&self) -> usize {
        self.path.matches('.').count()
    }

    pub fn is_choice(&self) -> bool {
        self.path.ends_with("[x]")
    }

    pub fn types(&self) -> &[ElementDefinitionType] {
        self.r#type.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDefinitionType {
    pub extension: Option<Vec<Extension>>,
    pub code: String,
}

impl ElementDefinitionType {
    /// Creates a new ElementDefinitionType with just a code.
    pub fn new(code: impl Into<String>) -> ElementDefinitionType {
        ElementDefinitionType {
            extension: None,
            code: code.into(),
        }
    }

    /// The FHIR type recorded by the `structuredefinition-fhir-type` extension.
    pub fn fhir_type_extension(&self) -> Option<&str> {
        self.extension
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|ext| ext.url == FHIR_TYPE_EXTENSION_URL)
            .and_then(|ext| ext.value_url.as_deref().or(ext.value_uri.as_deref()))
    }
}

/// Extension as it appears on ElementDefinition.type; only URI-valued
/// extensions are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extension {
    pub url: String,
    #[serde(rename = "valueUrl")]
    pub value_url: Option<String>,
    #[serde(rename = "valueUri")]
    pub value_uri: Option<String>,
}
