//! # Type-Table Builder
//!
//! Turns StructureDefinitions (or ready-made descriptors from a manifest) into
//! the ordered list of [`TypeDescriptor`]s that backs a [`TypeRegistry`].
//!
//! The System namespace is always seeded first. Each FHIR StructureDefinition
//! then yields one descriptor for its type, followed by one descriptor for
//! every backbone element it declares (`Patient.contact` → `PatientContact`).

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::descriptor::{ElementDescriptor, TypeDescriptor, TypeKind, TypeRef};
use crate::element_definition::{ElementDefinition, ElementDefinitionType};
use crate::error::{SchemaError, SchemaResult};
use crate::fhir_version::FhirVersion;
use crate::format_helpers::{
    backbone_type_name, canonical_tail, choice_element_name, extract_content_reference_id,
};
use crate::registry::TypeRegistry;
use crate::structure_definition::StructureDefinition;
use crate::system_types::{system_type_descriptors, system_type_from_code};

/// Accumulates descriptors from any number of sources and validates them
/// into a registry.
#[derive(Debug, Clone)]
pub struct TypeTableBuilder {
    namespace: String,
    fhir_version: Option<FhirVersion>,
    element_types_must_resolve: bool,
    descriptors: Vec<TypeDescriptor>,
    seeded: usize,
}

impl TypeTableBuilder {
    /// Creates a builder for types in `namespace`, seeded with the System types.
    pub fn new(namespace: impl Into<String>) -> Self {
        let descriptors = system_type_descriptors();
        let seeded = descriptors.len();
        Self {
            namespace: namespace.into(),
            fhir_version: None,
            element_types_must_resolve: true,
            descriptors,
            seeded,
        }
    }

    pub fn with_fhir_version(mut self, version: FhirVersion) -> Self {
        self.fhir_version = Some(version);
        self
    }

    /// Controls whether every element type has to resolve inside the table.
    pub fn with_element_type_check(mut self, enabled: bool) -> Self {
        self.element_types_must_resolve = enabled;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn descriptors(&self) -> &[TypeDescriptor] {
        &self.descriptors
    }

    /// Adds the descriptors derived from one StructureDefinition and returns
    /// how many were added. Profiles and unknown kinds are skipped.
    pub fn add_structure_definition(&mut self, sd: &StructureDefinition) -> SchemaResult<usize> {
        let descriptors = structure_definition_to_descriptors(sd, &self.namespace)?;
        let count = descriptors.len();
        self.descriptors.extend(descriptors);
        Ok(count)
    }

    pub fn add_structure_definitions<'a, I>(&mut self, definitions: I) -> SchemaResult<usize>
    where
        I: IntoIterator<Item = &'a StructureDefinition>,
    {
        let mut count = 0;
        for sd in definitions {
            count += self.add_structure_definition(sd)?;
        }
        Ok(count)
    }

    /// Adds ready-made descriptors, e.g. from a manifest.
    ///
    /// System descriptors identical to the seeded ones are dropped so that an
    /// exported table can be loaded back; anything else is kept and left to
    /// the registry's duplicate check.
    pub fn add_descriptors(&mut self, descriptors: Vec<TypeDescriptor>) -> usize {
        let mut count = 0;
        for descriptor in descriptors {
            if self.descriptors[..self.seeded].contains(&descriptor) {
                continue;
            }
            self.descriptors.push(descriptor);
            count += 1;
        }
        count
    }

    /// Validates the accumulated table and builds the registry.
    pub fn build(self) -> SchemaResult<TypeRegistry> {
        TypeRegistry::with_options(
            self.descriptors,
            self.fhir_version,
            self.element_types_must_resolve,
        )
    }
}

/// Derives the descriptors for one StructureDefinition.
///
/// Returns an empty list for profiles (`derivation = constraint`) and for
/// definitions whose kind is not a type kind.
pub fn structure_definition_to_descriptors(
    sd: &StructureDefinition,
    namespace: &str,
) -> SchemaResult<Vec<TypeDescriptor>> {
    if sd.is_constraint() {
        debug!("Skipping profile {}", sd.url);
        return Ok(Vec::new());
    }
    let Some(kind) = TypeKind::from_structure_definition_kind(&sd.kind) else {
        warn!("Skipping {} with unsupported kind '{}'", sd.url, sd.kind);
        return Ok(Vec::new());
    };

    let type_name = sd.type_name();
    let base_type = match &sd.base_definition {
        Some(base) => Some(TypeRef::new(namespace, canonical_tail(base))),
        None => Some(TypeRef::any()),
    };

    let elements: Vec<&ElementDefinition> = sd
        .elements()
        .iter()
        .filter(|e| e.slice_name.is_none())
        .filter(|e| !e.id.as_deref().is_some_and(|id| id.contains(':')))
        .collect();

    for element in &elements {
        let root = element.path.split('.').next().unwrap_or_default();
        if root != type_name {
            return Err(SchemaError::malformed(
                &sd.url,
                format!("element path '{}' is outside type '{}'", element.path, type_name),
            ));
        }
    }

    let mut root = TypeDescriptor::new(namespace, type_name, base_type, kind);
    root.is_abstract = sd.r#abstract;
    root.url = Some(sd.url.clone());

    let mut walker = ElementWalker {
        sd,
        namespace,
        elements: &elements,
        nested: Vec::new(),
    };
    root.elements = walker.collect(type_name, kind == TypeKind::PrimitiveType)?;

    let mut descriptors = Vec::with_capacity(walker.nested.len() + 1);
    descriptors.push(root);
    descriptors.extend(walker.nested);
    Ok(descriptors)
}

struct ElementWalker<'a> {
    sd: &'a StructureDefinition,
    namespace: &'a str,
    elements: &'a [&'a ElementDefinition],
    nested: Vec<TypeDescriptor>,
}

impl<'a> ElementWalker<'a> {
    /// Collects the direct children of `owner_path`, synthesizing nested
    /// descriptors for backbone children along the way.
    fn collect(
        &mut self,
        owner_path: &str,
        skip_primitive_value: bool,
    ) -> SchemaResult<Vec<ElementDescriptor>> {
        let children: Vec<&'a ElementDefinition> = self.children_of(owner_path).collect();
        let mut out: Vec<ElementDescriptor> = Vec::with_capacity(children.len());
        let mut seen: HashSet<String> = HashSet::new();

        for child in children {
            let name = child.name();
            if skip_primitive_value && name == "value" {
                continue;
            }

            for element in self.element_descriptors(child)? {
                if !seen.insert(element.name.clone()) {
                    return Err(SchemaError::malformed(
                        &self.sd.url,
                        format!("duplicate element '{}' under '{}'", element.name, owner_path),
                    ));
                }
                out.push(element);
            }
        }
        Ok(out)
    }

    fn children_of(&self, owner_path: &str) -> impl Iterator<Item = &'a ElementDefinition> + 'a {
        let prefix = format!("{}.", owner_path);
        let depth = owner_path.matches('.').count() + 1;
        let elements: &'a [&'a ElementDefinition] = self.elements;
        elements
            .iter()
            .copied()
            .filter(move |e| e.path.starts_with(&prefix) && e.depth() == depth)
    }

    fn has_children(&self, path: &str) -> bool {
        self.children_of(path).next().is_some()
    }

    fn element_descriptors(
        &mut self,
        element: &'a ElementDefinition,
    ) -> SchemaResult<Vec<ElementDescriptor>> {
        let is_list = element.is_list();

        if let Some(reference) = &element.content_reference {
            let target = extract_content_reference_id(reference).ok_or_else(|| {
                SchemaError::malformed(
                    &self.sd.url,
                    format!("invalid contentReference '{}' on {}", reference, element.path),
                )
            })?;
            if !self.elements.iter().any(|e| e.path == target) {
                return Err(SchemaError::malformed(
                    &self.sd.url,
                    format!("contentReference '{}' on {} points to an unknown path", reference, element.path),
                ));
            }
            let type_ref = TypeRef::new(self.namespace, backbone_type_name(target));
            return Ok(vec![ElementDescriptor::new(element.name(), type_ref, is_list)]);
        }

        let types = element.types();
        if types.is_empty() {
            return Err(SchemaError::malformed(
                &self.sd.url,
                format!("element {} has neither a type nor a contentReference", element.path),
            ));
        }

        if element.is_choice() {
            let base_name = element.name().trim_end_matches("[x]");
            return Ok(types
                .iter()
                .map(|t| {
                    let type_ref = self.resolve_type_code(t);
                    let name = choice_element_name(base_name, &type_ref.name);
                    ElementDescriptor::choice(name, type_ref, is_list, base_name)
                })
                .collect());
        }

        if types.len() > 1 {
            warn!(
                "Element {} declares {} types without being a choice; using '{}'",
                element.path,
                types.len(),
                types[0].code
            );
        }
        let code = types[0].code.as_str();

        if matches!(code, "BackboneElement" | "Element") && self.has_children(&element.path) {
            let type_name = backbone_type_name(&element.path);
            let mut nested = TypeDescriptor::new(
                self.namespace,
                type_name.clone(),
                Some(TypeRef::new(self.namespace, code)),
                TypeKind::BackboneElement,
            );
            nested.url = Some(format!("{}#{}", self.sd.url, element.path));

            // Reserve the slot first so nested types keep pre-order.
            let slot = self.nested.len();
            self.nested.push(nested);
            let elements = self.collect(&element.path, false)?;
            self.nested[slot].elements = elements;

            let type_ref = TypeRef::new(self.namespace, type_name);
            return Ok(vec![ElementDescriptor::new(element.name(), type_ref, is_list)]);
        }

        let type_ref = self.resolve_type_code(&types[0]);
        Ok(vec![ElementDescriptor::new(element.name(), type_ref, is_list)])
    }

    /// Maps an ElementDefinition type code onto a type reference.
    ///
    /// FHIRPath System codes keep the System namespace unless the
    /// `structuredefinition-fhir-type` extension names the FHIR type.
    fn resolve_type_code(&self, t: &ElementDefinitionType) -> TypeRef {
        if let Some(system) = system_type_from_code(&t.code) {
            return match t.fhir_type_extension() {
                Some(fhir_type) => TypeRef::new(self.namespace, canonical_tail(fhir_type)),
                None => system,
            };
        }
        TypeRef::new(self.namespace, canonical_tail(&t.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_definition::Extension;
    use crate::structure_definition::StructureDefinitionSnapshotOrDifferential;

    fn element(path: &str, max: &str, codes: &[&str]) -> ElementDefinition {
        ElementDefinition {
            id: Some(path.to_string()),
            path: path.to_string(),
            max: Some(max.to_string()),
            r#type: if codes.is_empty() {
                None
            } else {
                Some(codes.iter().map(|c| ElementDefinitionType::new(*c)).collect())
            },
            ..Default::default()
        }
    }

    fn definition(name: &str, kind: &str, base: Option<&str>, elements: Vec<ElementDefinition>) -> StructureDefinition {
        StructureDefinition {
            url: format!("http://hl7.org/fhir/StructureDefinition/{}", name),
            name: name.to_string(),
            kind: kind.to_string(),
            r#type: Some(name.to_string()),
            base_definition: base.map(|b| format!("http://hl7.org/fhir/StructureDefinition/{}", b)),
            derivation: base.map(|_| "specialization".to_string()),
            snapshot: Some(StructureDefinitionSnapshotOrDifferential {
                element: Some(elements),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_primitive_value_is_not_an_element() {
        let mut id = element("string.id", "1", &["http://hl7.org/fhirpath/System.String"]);
        id.r#type.as_mut().unwrap()[0].extension = Some(vec![Extension {
            url: crate::element_definition::FHIR_TYPE_EXTENSION_URL.to_string(),
            value_url: Some("string".to_string()),
            value_uri: None,
        }]);
        let sd = definition(
            "string",
            "primitive-type",
            Some("PrimitiveType"),
            vec![
                element("string", "*", &[]),
                id,
                element("string.extension", "*", &["Extension"]),
                element("string.value", "1", &["http://hl7.org/fhirpath/System.String"]),
            ],
        );

        let descriptors = structure_definition_to_descriptors(&sd, "FHIR").unwrap();
        assert_eq!(descriptors.len(), 1);
        let names: Vec<_> = descriptors[0].elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["id", "extension"]);
        assert_eq!(descriptors[0].elements[0].type_ref, TypeRef::fhir("string"));
        assert!(descriptors[0].elements[1].is_list);
    }

    #[test]
    fn test_backbone_elements_are_emitted_in_pre_order() {
        let sd = definition(
            "Questionnaire",
            "resource",
            Some("DomainResource"),
            vec![
                element("Questionnaire", "*", &[]),
                element("Questionnaire.item", "*", &["BackboneElement"]),
                element("Questionnaire.item.linkId", "1", &["string"]),
                element("Questionnaire.item.answerOption", "*", &["BackboneElement"]),
                element("Questionnaire.item.answerOption.value[x]", "1", &["integer", "Coding"]),
                ElementDefinition {
                    content_reference: Some("#Questionnaire.item".to_string()),
                    ..element("Questionnaire.item.item", "*", &[])
                },
            ],
        );

        let descriptors = structure_definition_to_descriptors(&sd, "FHIR").unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Questionnaire", "QuestionnaireItem", "QuestionnaireItemAnswerOption"]
        );

        let item = &descriptors[1];
        assert_eq!(item.kind, TypeKind::BackboneElement);
        assert_eq!(item.base_type, Some(TypeRef::fhir("BackboneElement")));
        let nested_item = item.element("item").unwrap();
        assert_eq!(nested_item.type_ref, TypeRef::fhir("QuestionnaireItem"));
        assert!(nested_item.is_list);

        let option = &descriptors[2];
        let value_names: Vec<_> = option.choice_elements("value").map(|e| e.name.as_str()).collect();
        assert_eq!(value_names, vec!["valueInteger", "valueCoding"]);
    }

    #[test]
    fn test_profiles_are_skipped() {
        let mut sd = definition("Patient", "resource", Some("DomainResource"), vec![]);
        sd.derivation = Some("constraint".to_string());
        assert!(structure_definition_to_descriptors(&sd, "FHIR").unwrap().is_empty());
    }

    #[test]
    fn test_untyped_element_is_malformed() {
        let sd = definition(
            "Period",
            "complex-type",
            Some("DataType"),
            vec![element("Period", "*", &[]), element("Period.start", "1", &[])],
        );
        let err = structure_definition_to_descriptors(&sd, "FHIR").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedDefinition { .. }));
    }

    #[test]
    fn test_foreign_path_is_malformed() {
        let sd = definition(
            "Period",
            "complex-type",
            Some("DataType"),
            vec![element("Period", "*", &[]), element("Range.low", "1", &["Quantity"])],
        );
        assert!(structure_definition_to_descriptors(&sd, "FHIR").is_err());
    }

    #[test]
    fn test_missing_base_definition_roots_at_system_any() {
        let sd = definition("Base", "complex-type", None, vec![element("Base", "*", &[])]);
        let descriptors = structure_definition_to_descriptors(&sd, "FHIR").unwrap();
        assert_eq!(descriptors[0].base_type, Some(TypeRef::any()));
        assert!(descriptors[0].elements.is_empty());
    }
}
