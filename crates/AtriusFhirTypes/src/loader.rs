//! # Schema Loader
//!
//! Reads schema sources from strings, files or directories and feeds them to a
//! [`TypeTableBuilder`]. Three JSON shapes are recognised:
//!
//! - a `Bundle` of StructureDefinitions (`profiles-types.json`, `profiles-resources.json`)
//! - a single `StructureDefinition`
//! - a [`TypeManifest`] (an object with a `types` array)

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::builder::TypeTableBuilder;
use crate::bundle::Bundle;
use crate::descriptor::FHIR_NAMESPACE;
use crate::error::{SchemaError, SchemaResult};
use crate::fhir_version::FhirVersion;
use crate::manifest::TypeManifest;
use crate::registry::TypeRegistry;
use crate::structure_definition::StructureDefinition;

/// Settings that control how sources are turned into a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    pub fhir_version: FhirVersion,
    /// Namespace given to the FHIR types
    pub namespace: String,
    /// Reject tables whose element types do not resolve
    pub element_types_must_resolve: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            fhir_version: FhirVersion::default(),
            namespace: FHIR_NAMESPACE.to_string(),
            element_types_must_resolve: true,
        }
    }
}

/// A parsed schema document.
#[derive(Debug)]
pub enum SchemaSource {
    StructureDefinitions(Vec<StructureDefinition>),
    Manifest(TypeManifest),
}

impl SchemaSource {
    /// Parses a JSON document and detects its shape.
    pub fn from_json_str(source_name: &str, json: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(json).map_err(|source| SchemaError::Parse {
            source_name: source_name.to_string(),
            source,
        })?;
        Self::from_value(source_name, value)
    }

    pub fn from_value(source_name: &str, value: Value) -> SchemaResult<Self> {
        let parse_error = |source| SchemaError::Parse {
            source_name: source_name.to_string(),
            source,
        };

        match value.get("resourceType").and_then(Value::as_str) {
            Some("Bundle") => {
                let bundle: Bundle = serde_json::from_value(value).map_err(parse_error)?;
                Ok(SchemaSource::StructureDefinitions(
                    bundle.structure_definitions(),
                ))
            }
            Some("StructureDefinition") => {
                let sd: StructureDefinition =
                    serde_json::from_value(value).map_err(parse_error)?;
                Ok(SchemaSource::StructureDefinitions(vec![sd]))
            }
            Some(other) => Err(SchemaError::UnsupportedSource(format!(
                "{}: resourceType '{}' carries no type definitions",
                source_name, other
            ))),
            None if value.get("types").is_some_and(Value::is_array) => {
                let manifest: TypeManifest = serde_json::from_value(value).map_err(parse_error)?;
                Ok(SchemaSource::Manifest(manifest))
            }
            None => Err(SchemaError::UnsupportedSource(format!(
                "{}: expected a Bundle, a StructureDefinition or a type manifest",
                source_name
            ))),
        }
    }
}

/// Accumulates schema sources and builds a validated registry.
///
/// ```no_run
/// use atrius_fhir_types::{LoaderOptions, RegistryLoader};
///
/// let mut loader = RegistryLoader::new(LoaderOptions::default());
/// loader.add_file("definitions/profiles-types.json")?;
/// loader.add_file("definitions/profiles-resources.json")?;
/// let registry = loader.build()?;
/// # Ok::<(), atrius_fhir_types::SchemaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RegistryLoader {
    options: LoaderOptions,
    builder: TypeTableBuilder,
}

impl RegistryLoader {
    pub fn new(options: LoaderOptions) -> Self {
        let builder = TypeTableBuilder::new(options.namespace.clone())
            .with_fhir_version(options.fhir_version)
            .with_element_type_check(options.element_types_must_resolve);
        Self { options, builder }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Adds a parsed source and returns the number of descriptors it contributed.
    pub fn add_source(&mut self, source: SchemaSource) -> SchemaResult<usize> {
        match source {
            SchemaSource::StructureDefinitions(definitions) => {
                for sd in &definitions {
                    if let Some(release) = &sd.fhir_version {
                        if !self.options.fhir_version.matches_release(release) {
                            warn!(
                                "{} declares fhirVersion {} but the loader targets {}",
                                sd.url, release, self.options.fhir_version
                            );
                        }
                    }
                }
                self.builder.add_structure_definitions(&definitions)
            }
            SchemaSource::Manifest(manifest) => {
                if let Some(version) = manifest.fhir_version {
                    if version != self.options.fhir_version {
                        warn!(
                            "Manifest describes {} but the loader targets {}",
                            version, self.options.fhir_version
                        );
                    }
                }
                if manifest.namespace != self.options.namespace {
                    warn!(
                        "Manifest namespace '{}' differs from loader namespace '{}'",
                        manifest.namespace, self.options.namespace
                    );
                }
                Ok(self.builder.add_descriptors(manifest.into_descriptors()))
            }
        }
    }

    pub fn add_str(&mut self, source_name: &str, json: &str) -> SchemaResult<usize> {
        let source = SchemaSource::from_json_str(source_name, json)?;
        let count = self.add_source(source)?;
        debug!("Loaded {} types from {}", count, source_name);
        Ok(count)
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) -> SchemaResult<usize> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| SchemaError::io(path, e))?;
        let source_name = path.display().to_string();
        let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            SchemaError::Parse {
                source_name: source_name.clone(),
                source,
            }
        })?;
        let count = self.add_source(SchemaSource::from_value(&source_name, value)?)?;
        info!("Loaded {} types from {}", count, source_name);
        Ok(count)
    }

    /// Adds every schema file below `dir`, in sorted path order.
    pub fn add_dir(&mut self, dir: impl AsRef<Path>) -> SchemaResult<usize> {
        let dir = dir.as_ref();
        let mut count = 0;
        for path in visit_dirs(dir)? {
            count += self.add_file(&path)?;
        }
        Ok(count)
    }

    /// Adds a file or a directory.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> SchemaResult<usize> {
        let path = path.as_ref();
        if path.is_dir() {
            self.add_dir(path)
        } else {
            self.add_file(path)
        }
    }

    pub fn build(self) -> SchemaResult<TypeRegistry> {
        self.builder.build()
    }
}

/// Recursively collects the JSON files below `dir` that can carry type
/// definitions, sorted for deterministic load order.
///
/// Terminology and packaging files (`valueset`, `conceptmap`, `bundle-entry`,
/// `download_metadata`) are skipped by name.
pub fn visit_dirs(dir: &Path) -> SchemaResult<Vec<PathBuf>> {
    let mut json_files = Vec::new();
    if dir.is_dir() {
        let entries = fs::read_dir(dir).map_err(|e| SchemaError::io(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| SchemaError::io(dir, e))?.path();
            if path.is_dir() {
                json_files.extend(visit_dirs(&path)?);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                let filename = path
                    .file_name()
                    .map(|f| f.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if !filename.contains("conceptmap")
                    && !filename.contains("valueset")
                    && !filename.contains("bundle-entry")
                    && !filename.contains("download_metadata")
                {
                    json_files.push(path);
                }
            }
        }
    }
    json_files.sort();
    Ok(json_files)
}

/// Builds a registry from a single JSON string.
pub fn load_str(source_name: &str, json: &str, options: LoaderOptions) -> SchemaResult<TypeRegistry> {
    let mut loader = RegistryLoader::new(options);
    loader.add_str(source_name, json)?;
    loader.build()
}

/// Builds a registry from files and directories.
pub fn load_paths<P: AsRef<Path>>(paths: &[P], options: LoaderOptions) -> SchemaResult<TypeRegistry> {
    let mut loader = RegistryLoader::new(options);
    for path in paths {
        loader.add_path(path)?;
    }
    loader.build()
}

/// Builds a registry from one schema file.
pub fn load_file(path: impl AsRef<Path>, options: LoaderOptions) -> SchemaResult<TypeRegistry> {
    let mut loader = RegistryLoader::new(options);
    loader.add_file(path)?;
    loader.build()
}

/// Builds a registry from every schema file below `dir`.
pub fn load_dir(dir: impl AsRef<Path>, options: LoaderOptions) -> SchemaResult<TypeRegistry> {
    let mut loader = RegistryLoader::new(options);
    loader.add_dir(dir)?;
    loader.build()
}
