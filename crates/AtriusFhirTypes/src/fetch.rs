//! Download of the official FHIR definitions.
//!
//! HL7 publishes every release as `definitions.json.zip`. Only the two
//! bundles that carry type definitions are extracted.

use std::fs::{self, File};
use std::io::copy;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::{SchemaError, SchemaResult};
use crate::fhir_version::FhirVersion;

/// Bundles extracted from the definitions archive.
pub const DEFINITION_FILES: [&str; 2] = ["profiles-types.json", "profiles-resources.json"];

const MAX_RETRIES: u32 = 3;

/// Downloads the definitions for `version` into `out_dir` and returns the
/// paths of the extracted bundles.
pub fn fetch_definitions(version: FhirVersion, out_dir: &Path) -> SchemaResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|e| SchemaError::io(out_dir, e))?;

    let url = version.definitions_url();
    let archive_path = out_dir.join("definitions.json.zip");
    info!("Downloading {} definitions from {}", version, url);

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("atrius-fhir-types/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| SchemaError::Download(format!("Failed to create HTTP client: {}", e)))?;

    let mut last_error = None;
    for attempt in 1..=MAX_RETRIES {
        match download(&client, url, &archive_path) {
            Ok(bytes) => {
                info!("Downloaded {} bytes", bytes);
                last_error = None;
                break;
            }
            Err(e) => {
                warn!("Download attempt {} of {} failed: {}", attempt, MAX_RETRIES, e);
                last_error = Some(e);
                if attempt < MAX_RETRIES {
                    thread::sleep(Duration::from_secs(5 * attempt as u64));
                }
            }
        }
    }
    if let Some(error) = last_error {
        return Err(SchemaError::Download(format!(
            "Failed to download {} after {} attempts: {}",
            url, MAX_RETRIES, error
        )));
    }

    let extracted = extract_definitions(&archive_path, out_dir)?;
    fs::remove_file(&archive_path).map_err(|e| SchemaError::io(&archive_path, e))?;
    info!("{} definitions written to {}", version, out_dir.display());
    Ok(extracted)
}

fn download(client: &reqwest::blocking::Client, url: &str, output_path: &Path) -> Result<u64, String> {
    let mut response = client
        .get(url)
        .send()
        .map_err(|e| format!("Failed to GET from url: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Download failed with status: {}", response.status()));
    }

    if let Some(content_type) = response.headers().get("content-type") {
        let content_type = content_type.to_str().unwrap_or("");
        if !content_type.contains("zip") {
            return Err(format!("Expected ZIP file but got content-type: {}", content_type));
        }
    }

    let mut file =
        File::create(output_path).map_err(|e| format!("Failed to create the file: {}", e))?;
    let bytes = copy(&mut response, &mut file).map_err(|e| format!("Failed to copy the file: {}", e))?;
    file.sync_all()
        .map_err(|e| format!("Failed to flush file to disk: {}", e))?;
    if bytes == 0 {
        return Err("Downloaded file is empty".to_string());
    }
    Ok(bytes)
}

/// Extracts the type-bearing bundles from a definitions archive.
pub fn extract_definitions(archive_path: &Path, out_dir: &Path) -> SchemaResult<Vec<PathBuf>> {
    let file = File::open(archive_path).map_err(|e| SchemaError::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| SchemaError::Download(format!("{}: {}", archive_path.display(), e)))?;

    let mut extracted = Vec::with_capacity(DEFINITION_FILES.len());
    for name in DEFINITION_FILES {
        let mut entry = archive
            .by_name(name)
            .map_err(|e| SchemaError::Download(format!("{} missing from archive: {}", name, e)))?;
        let out_path = out_dir.join(name);
        let mut out_file = File::create(&out_path).map_err(|e| SchemaError::io(&out_path, e))?;
        copy(&mut entry, &mut out_file).map_err(|e| SchemaError::io(&out_path, e))?;
        extracted.push(out_path);
    }
    Ok(extracted)
}
