//! # Type Registry
//!
//! Immutable index over a validated type table. Built once at startup and
//! shared read-only (typically behind an `Arc`) by every evaluator.
//!
//! Construction enforces the table invariants:
//! - every `(namespace, name)` pair appears once
//! - `System.Any` is the only type without a base
//! - every base reference resolves, and following bases always reaches the root
//! - optionally, every element type resolves

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::info;

use crate::descriptor::{ElementDescriptor, SYSTEM_NAMESPACE, TypeDescriptor, TypeKind, TypeRef};
use crate::error::{SchemaError, SchemaResult};
use crate::fhir_version::FhirVersion;

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    descriptors: Vec<TypeDescriptor>,
    index: HashMap<TypeRef, usize>,
    children: HashMap<TypeRef, Vec<usize>>,
    fhir_version: Option<FhirVersion>,
}

impl TypeRegistry {
    /// Validates `descriptors` and builds the registry, requiring element
    /// types to resolve.
    pub fn new(descriptors: Vec<TypeDescriptor>) -> SchemaResult<Self> {
        Self::with_options(descriptors, None, true)
    }

    pub fn with_options(
        descriptors: Vec<TypeDescriptor>,
        fhir_version: Option<FhirVersion>,
        element_types_must_resolve: bool,
    ) -> SchemaResult<Self> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.type_ref(), position).is_some() {
                return Err(SchemaError::DuplicateType(descriptor.type_ref()));
            }
        }

        let root = TypeRef::any();
        match index.get(&root) {
            Some(&position) if descriptors[position].base_type.is_none() => {}
            _ => return Err(SchemaError::MissingRoot),
        }

        let mut children: HashMap<TypeRef, Vec<usize>> = HashMap::new();
        for (position, descriptor) in descriptors.iter().enumerate() {
            match &descriptor.base_type {
                Some(base) => {
                    if !index.contains_key(base) {
                        return Err(SchemaError::UnresolvedBase {
                            type_ref: descriptor.type_ref(),
                            base: base.clone(),
                        });
                    }
                    children.entry(base.clone()).or_default().push(position);
                }
                None if descriptor.type_ref() == root => {}
                None => {
                    return Err(SchemaError::malformed(
                        descriptor.type_ref().to_string(),
                        "only System.Any may omit its base type",
                    ));
                }
            }
        }

        let registry = Self {
            descriptors,
            index,
            children,
            fhir_version,
        };
        registry.check_acyclic()?;
        if element_types_must_resolve {
            registry.check_element_types()?;
        }

        info!(
            "Type registry ready: {} types across {} namespaces",
            registry.len(),
            registry.namespaces().len()
        );
        Ok(registry)
    }

    /// Every chain of base links must reach the root within `len()` steps.
    fn check_acyclic(&self) -> SchemaResult<()> {
        let mut reaches_root: HashSet<usize> = HashSet::new();
        for start in 0..self.descriptors.len() {
            let mut path = Vec::new();
            let mut current = start;
            loop {
                if reaches_root.contains(&current) {
                    break;
                }
                path.push(current);
                if path.len() > self.descriptors.len() {
                    return Err(SchemaError::InheritanceCycle(
                        self.descriptors[start].type_ref(),
                    ));
                }
                match &self.descriptors[current].base_type {
                    Some(base) => current = self.index[base],
                    None => break,
                }
            }
            reaches_root.extend(path);
        }
        Ok(())
    }

    fn check_element_types(&self) -> SchemaResult<()> {
        for descriptor in &self.descriptors {
            for element in &descriptor.elements {
                if !self.index.contains_key(&element.type_ref) {
                    return Err(SchemaError::UnresolvedElementType {
                        type_ref: descriptor.type_ref(),
                        element: element.name.clone(),
                        target: element.type_ref.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The ordered type table.
    pub fn descriptors(&self) -> &[TypeDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn fhir_version(&self) -> Option<FhirVersion> {
        self.fhir_version
    }

    /// Distinct namespaces in table order.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = Vec::new();
        for descriptor in &self.descriptors {
            if !namespaces.contains(&descriptor.namespace.as_str()) {
                namespaces.push(&descriptor.namespace);
            }
        }
        namespaces
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.descriptors.iter().any(|d| d.namespace == namespace)
    }

    pub fn get(&self, type_ref: &TypeRef) -> Option<&TypeDescriptor> {
        self.index.get(type_ref).map(|&i| &self.descriptors[i])
    }

    pub fn get_by_name(&self, namespace: &str, name: &str) -> Option<&TypeDescriptor> {
        self.get(&TypeRef::new(namespace, name))
    }

    pub fn contains(&self, type_ref: &TypeRef) -> bool {
        self.index.contains_key(type_ref)
    }

    /// The direct parent of a type.
    pub fn base_of(&self, type_ref: &TypeRef) -> Option<&TypeDescriptor> {
        self.get(type_ref)?
            .base_type
            .as_ref()
            .and_then(|base| self.get(base))
    }

    /// Ancestors from the direct parent up to `System.Any`.
    ///
    /// Empty for the root and for unknown types.
    pub fn ancestors(&self, type_ref: &TypeRef) -> Vec<&TypeDescriptor> {
        let mut chain = Vec::new();
        let mut current = self.base_of(type_ref);
        while let Some(descriptor) = current {
            chain.push(descriptor);
            current = descriptor.base_type.as_ref().and_then(|b| self.get(b));
        }
        chain
    }

    /// The type itself followed by its ancestors.
    pub fn lineage(&self, type_ref: &TypeRef) -> Vec<&TypeDescriptor> {
        let Some(descriptor) = self.get(type_ref) else {
            return Vec::new();
        };
        let mut chain = vec![descriptor];
        chain.extend(self.ancestors(type_ref));
        chain
    }

    /// Whether `child` is `parent` or derives from it.
    pub fn is_subtype_of(&self, child: &TypeRef, parent: &TypeRef) -> bool {
        if !self.contains(child) {
            return false;
        }
        child == parent
            || self
                .ancestors(child)
                .iter()
                .any(|ancestor| ancestor.namespace == parent.namespace && ancestor.name == parent.name)
    }

    /// Direct subtypes, in table order.
    pub fn subtypes(&self, type_ref: &TypeRef) -> Vec<&TypeDescriptor> {
        self.children
            .get(type_ref)
            .map(|positions| positions.iter().map(|&i| &self.descriptors[i]).collect())
            .unwrap_or_default()
    }

    /// Finds an element on the type or, failing that, on its ancestors.
    pub fn element(&self, type_ref: &TypeRef, name: &str) -> Option<&ElementDescriptor> {
        self.lineage(type_ref)
            .into_iter()
            .find_map(|descriptor| descriptor.element(name))
    }

    /// The expanded entries of choice element `base_name` (`value` →
    /// `valueString`, `valueQuantity`, ...) from the nearest type declaring it.
    pub fn choice_elements(&self, type_ref: &TypeRef, base_name: &str) -> Vec<&ElementDescriptor> {
        for descriptor in self.lineage(type_ref) {
            let choices: Vec<_> = descriptor.choice_elements(base_name).collect();
            if !choices.is_empty() {
                return choices;
            }
        }
        Vec::new()
    }

    /// Own elements followed by inherited elements not already declared,
    /// nearest ancestor first.
    pub fn all_elements(&self, type_ref: &TypeRef) -> Vec<&ElementDescriptor> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut elements = Vec::new();
        for descriptor in self.lineage(type_ref) {
            for element in &descriptor.elements {
                if seen.insert(element.name.as_str()) {
                    elements.push(element);
                }
            }
        }
        elements
    }

    /// Resolves a FHIRPath type specifier.
    ///
    /// `FHIR.Patient` and `System.String` are looked up as written. Unqualified
    /// names are tried in `default_namespace` first and then in `System`.
    pub fn resolve_specifier(
        &self,
        specifier: &str,
        default_namespace: &str,
    ) -> Option<&TypeDescriptor> {
        let specifier = specifier.trim().trim_matches('`');
        match TypeRef::parse_qualified(specifier) {
            (Some(namespace), name) if self.has_namespace(namespace) => {
                self.get_by_name(namespace, name.trim_matches('`'))
            }
            _ => self
                .get_by_name(default_namespace, specifier)
                .or_else(|| self.get_by_name(SYSTEM_NAMESPACE, specifier)),
        }
    }

    /// The resource type named by a JSON instance's `resourceType`.
    pub fn resource_type_of(&self, instance: &Value, namespace: &str) -> Option<&TypeDescriptor> {
        let name = instance.get("resourceType")?.as_str()?;
        self.get_by_name(namespace, name)
            .filter(|d| d.kind == TypeKind::Resource)
    }

    /// Resource types in table order.
    pub fn resource_types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.iter().filter(|d| d.is_resource())
    }

    /// Number of descriptors per kind, in first-seen order.
    pub fn kind_counts(&self) -> Vec<(TypeKind, usize)> {
        let mut counts: Vec<(TypeKind, usize)> = Vec::new();
        for descriptor in &self.descriptors {
            match counts.iter_mut().find(|(kind, _)| *kind == descriptor.kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((descriptor.kind, 1)),
            }
        }
        counts
    }
}

impl PartialEq for TypeRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.descriptors == other.descriptors && self.fhir_version == other.fhir_version
    }
}

impl Eq for TypeRegistry {}
