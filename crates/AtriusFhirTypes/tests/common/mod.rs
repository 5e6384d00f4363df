#![allow(dead_code)]

use std::path::PathBuf;

use atrius_fhir_types::{LoaderOptions, TypeRegistry, load_file};

// Path of a fixture under tests/data
pub fn data_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(filename)
}

pub fn read_data(filename: &str) -> String {
    std::fs::read_to_string(data_path(filename))
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", filename, e))
}

// Registry built from the R5 core subset bundle
pub fn r5_registry() -> TypeRegistry {
    load_file(data_path("r5-core-subset.json"), LoaderOptions::default())
        .expect("r5 core subset should load")
}
