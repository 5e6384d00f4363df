mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use atrius_fhir_types::{TypeKind, TypeRef, TypeRegistry};
use common::r5_registry;

fn names(descriptors: &[&atrius_fhir_types::TypeDescriptor]) -> Vec<String> {
    descriptors.iter().map(|d| d.type_ref().to_string()).collect()
}

#[test]
fn test_system_types_come_first() {
    let registry = r5_registry();
    let first: Vec<_> = registry.iter().take(10).map(|d| d.type_ref()).collect();
    assert_eq!(first[0], TypeRef::any());
    assert!(registry.descriptors()[0].base_type.is_none());
    for type_ref in &first[1..] {
        assert!(type_ref.is_system());
        assert_eq!(registry.base_of(type_ref).map(|d| d.type_ref()), Some(TypeRef::any()));
    }
    assert!(registry.contains(&TypeRef::system("Quantity")));
    assert_eq!(registry.descriptors()[10].type_ref(), TypeRef::fhir("Base"));
}

#[test]
fn test_patient_lineage_reaches_system_any() {
    let registry = r5_registry();
    let lineage = registry.lineage(&TypeRef::fhir("Patient"));
    assert_eq!(
        names(&lineage),
        vec![
            "FHIR.Patient",
            "FHIR.DomainResource",
            "FHIR.Resource",
            "FHIR.Base",
            "System.Any"
        ]
    );
}

#[test]
fn test_every_base_chain_terminates_at_root() {
    let registry = r5_registry();
    for descriptor in registry.iter() {
        let ancestors = registry.ancestors(&descriptor.type_ref());
        assert!(ancestors.len() < registry.len());
        match ancestors.last() {
            Some(last) => assert_eq!(last.type_ref(), TypeRef::any()),
            None => assert_eq!(descriptor.type_ref(), TypeRef::any()),
        }
    }
}

#[test]
fn test_type_identity_is_unique() {
    let registry = r5_registry();
    let mut seen = HashSet::new();
    for descriptor in registry.iter() {
        assert!(seen.insert(descriptor.type_ref()), "duplicate {}", descriptor.type_ref());
    }
}

#[test]
fn test_every_reference_resolves() {
    let registry = r5_registry();
    for descriptor in registry.iter() {
        if let Some(base) = &descriptor.base_type {
            assert!(registry.contains(base), "{} has dangling base {}", descriptor.type_ref(), base);
        }
        for element in &descriptor.elements {
            assert!(
                registry.contains(&element.type_ref),
                "{}.{} has dangling type {}",
                descriptor.type_ref(),
                element.name,
                element.type_ref
            );
        }
    }
}

#[test]
fn test_string_primitive_shape() {
    let registry = r5_registry();
    let string = registry.get(&TypeRef::fhir("string")).unwrap();
    assert_eq!(string.kind, TypeKind::PrimitiveType);
    assert_eq!(string.base_type, Some(TypeRef::fhir("PrimitiveType")));
    assert_eq!(string.elements.len(), 2);

    let id = &string.elements[0];
    assert_eq!(id.exported_name(), "Id");
    assert_eq!(id.type_ref, TypeRef::fhir("string"));
    assert!(!id.is_list);

    let extension = &string.elements[1];
    assert_eq!(extension.exported_name(), "Extension");
    assert_eq!(extension.type_ref, TypeRef::fhir("Extension"));
    assert!(extension.is_list);
}

#[test]
fn test_human_name_elements_in_definition_order() {
    let registry = r5_registry();
    let human_name = registry.get_by_name("FHIR", "HumanName").unwrap();
    let exported: Vec<_> = human_name.elements.iter().map(|e| e.exported_name()).collect();
    assert_eq!(
        exported,
        vec!["Id", "Extension", "Use", "Text", "Family", "Given", "Prefix", "Suffix", "Period"]
    );

    let given = human_name.element("given").unwrap();
    assert!(given.is_list);
    assert_eq!(given.type_ref, TypeRef::fhir("string"));
    let period = human_name.element("period").unwrap();
    assert!(!period.is_list);
    assert_eq!(period.type_ref, TypeRef::fhir("Period"));

    let mut seen = HashSet::new();
    assert!(human_name.elements.iter().all(|e| seen.insert(&e.name)));
}

#[test]
fn test_system_typed_elements_follow_fhir_type_extension() {
    let registry = r5_registry();
    let extension = registry.get(&TypeRef::fhir("Extension")).unwrap();
    assert_eq!(extension.element("url").unwrap().type_ref, TypeRef::fhir("uri"));
    let resource = registry.get(&TypeRef::fhir("Resource")).unwrap();
    assert_eq!(resource.element("id").unwrap().type_ref, TypeRef::fhir("id"));
}

#[test]
fn test_choice_elements_are_expanded() {
    let registry = r5_registry();
    let patient = TypeRef::fhir("Patient");
    let deceased: Vec<_> = registry
        .choice_elements(&patient, "deceased")
        .iter()
        .map(|e| (e.name.as_str(), e.type_ref.name.as_str()))
        .collect();
    assert_eq!(
        deceased,
        vec![("deceasedBoolean", "boolean"), ("deceasedDateTime", "dateTime")]
    );
    assert!(registry.element(&patient, "deceased[x]").is_none());

    let values = registry.choice_elements(&TypeRef::fhir("Extension"), "value");
    assert!(values.iter().any(|e| e.name == "valueCodeableConcept"));
}

#[test]
fn test_choice_elements_outlive_the_lookup_name() {
    let registry = r5_registry();
    let patient = TypeRef::fhir("Patient");
    let deceased = {
        let base_name = String::from("deceased");
        registry.choice_elements(&patient, &base_name)
    };
    assert_eq!(deceased.len(), 2);
    assert!(deceased.iter().all(|e| e.choice_of.as_deref() == Some("deceased")));
}

#[test]
fn test_backbone_elements_get_named_types() {
    let registry = r5_registry();
    let contact = registry.element(&TypeRef::fhir("Patient"), "contact").unwrap();
    assert_eq!(contact.type_ref, TypeRef::fhir("PatientContact"));
    assert!(contact.is_list);

    let contact_type = registry.get(&contact.type_ref).unwrap();
    assert_eq!(contact_type.kind, TypeKind::BackboneElement);
    assert!(registry.is_subtype_of(&contact_type.type_ref(), &TypeRef::fhir("BackboneElement")));
    assert_eq!(
        registry.element(&contact_type.type_ref(), "name").unwrap().type_ref,
        TypeRef::fhir("HumanName")
    );

    // Nested types follow their owner.
    let position = |name: &str| {
        registry
            .iter()
            .position(|d| d.name == name)
            .unwrap()
    };
    assert_eq!(position("PatientContact"), position("Patient") + 1);
    assert_eq!(position("PatientLink"), position("Patient") + 2);
}

#[test]
fn test_slices_and_profiles_are_skipped() {
    let registry = r5_registry();
    let patient = registry.get(&TypeRef::fhir("Patient")).unwrap();
    assert_eq!(patient.elements.iter().filter(|e| e.name == "identifier").count(), 1);
    assert!(registry.get_by_name("FHIR", "USCorePatientProfile").is_none());
    assert!(registry.get_by_name("FHIR", "us-core-patient").is_none());
}

#[test]
fn test_subtype_queries() {
    let registry = r5_registry();
    let patient = TypeRef::fhir("Patient");
    assert!(registry.is_subtype_of(&patient, &patient));
    assert!(registry.is_subtype_of(&patient, &TypeRef::fhir("Resource")));
    assert!(registry.is_subtype_of(&patient, &TypeRef::any()));
    assert!(!registry.is_subtype_of(&TypeRef::fhir("Resource"), &patient));
    assert!(!registry.is_subtype_of(&TypeRef::fhir("Unknown"), &TypeRef::any()));

    let string_subtypes: Vec<_> = registry
        .subtypes(&TypeRef::fhir("string"))
        .iter()
        .map(|d| d.name.clone())
        .collect();
    assert_eq!(string_subtypes, vec!["code", "id"]);
}

#[test]
fn test_element_lookup_walks_base_types() {
    let registry = r5_registry();
    let contact = TypeRef::fhir("PatientContact");
    assert!(registry.element(&contact, "modifierExtension").is_some());
    assert!(registry.element(&TypeRef::fhir("Patient"), "nonexistent").is_none());

    let all: Vec<_> = registry
        .all_elements(&TypeRef::fhir("Coding"))
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(
        all,
        vec!["id", "extension", "system", "version", "code", "display", "userSelected"]
    );
}

#[test]
fn test_resolve_specifier() {
    let registry = r5_registry();
    let resolve = |s: &str| registry.resolve_specifier(s, "FHIR").map(|d| d.type_ref());
    assert_eq!(resolve("Patient"), Some(TypeRef::fhir("Patient")));
    assert_eq!(resolve("FHIR.Patient"), Some(TypeRef::fhir("Patient")));
    assert_eq!(resolve("System.String"), Some(TypeRef::system("String")));
    assert_eq!(resolve("Boolean"), Some(TypeRef::system("Boolean")));
    assert_eq!(resolve("boolean"), Some(TypeRef::fhir("boolean")));
    assert_eq!(resolve("Observation"), None);
}

#[test]
fn test_resource_queries() {
    let registry = r5_registry();
    let resources: Vec<_> = registry.resource_types().map(|d| d.name.as_str()).collect();
    assert_eq!(resources, vec!["Resource", "DomainResource", "Patient"]);

    let instance = serde_json::json!({ "resourceType": "Patient", "id": "example" });
    assert_eq!(
        registry.resource_type_of(&instance, "FHIR").map(|d| d.name.as_str()),
        Some("Patient")
    );
    let not_a_resource = serde_json::json!({ "resourceType": "HumanName" });
    assert!(registry.resource_type_of(&not_a_resource, "FHIR").is_none());
}

#[test]
fn test_namespaces_and_kind_counts() {
    let registry = r5_registry();
    assert_eq!(registry.namespaces(), vec!["System", "FHIR"]);
    assert!(registry.has_namespace("FHIR"));
    assert!(!registry.has_namespace("CQL"));

    let counts = registry.kind_counts();
    assert_eq!(counts[0], (TypeKind::System, 10));
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    assert_eq!(total, registry.len());
}

#[test]
fn test_loading_twice_is_idempotent() {
    assert_eq!(r5_registry(), r5_registry());
    assert_eq!(r5_registry().descriptors(), r5_registry().descriptors());
}

#[test]
fn test_registry_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TypeRegistry>();

    let registry = Arc::new(r5_registry());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry.is_subtype_of(&TypeRef::fhir("Patient"), &TypeRef::fhir("DomainResource"))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
