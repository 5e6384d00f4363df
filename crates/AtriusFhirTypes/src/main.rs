//! # FHIR Type Table CLI
//!
//! Command-line interface for loading, inspecting and exporting the FHIRPath
//! type table.
//!
//! ## Usage
//!
//! ```bash
//! # Download the R5 definitions
//! atrius-fhir-types fetch --out definitions/R5
//!
//! # Validate them and print the number of types per kind
//! atrius-fhir-types check definitions/R5
//!
//! # Show one type with its lineage and inherited elements
//! atrius-fhir-types show Patient --source definitions/R5 --inherited
//!
//! # Write a compact manifest
//! atrius-fhir-types export --source definitions/R5 -o fhir-r5-types.json
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use atrius_fhir_types::{
    FhirVersion, LoaderOptions, SchemaError, TypeManifest, TypeRegistry, load_paths,
};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the type table tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, env = "ATRIUS_TYPES_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// FHIR version the definitions belong to
    #[arg(
        long,
        global = true,
        value_enum,
        ignore_case = true,
        env = "ATRIUS_FHIR_VERSION",
        default_value_t = FhirVersion::R5
    )]
    fhir_version: FhirVersion,

    /// Namespace for the FHIR types
    #[arg(long, global = true, default_value = "FHIR")]
    namespace: String,

    /// Accept element types that do not resolve inside the table
    #[arg(long, global = true)]
    allow_unresolved_elements: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate schema sources, then print counts per kind
    Check {
        /// Bundles, StructureDefinitions, manifests or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print one type, its lineage and its elements
    Show {
        /// Type specifier such as `Patient` or `System.String`
        type_name: String,
        #[arg(short, long = "source", required = true)]
        sources: Vec<PathBuf>,
        /// Include elements inherited from base types
        #[arg(long)]
        inherited: bool,
    },
    /// Write the loaded table as a manifest
    Export {
        #[arg(short, long = "source", required = true)]
        sources: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Download the official definitions
    #[cfg(feature = "download")]
    Fetch {
        #[arg(long)]
        out: PathBuf,
    },
}

impl Cli {
    fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            fhir_version: self.fhir_version,
            namespace: self.namespace.clone(),
            element_types_must_resolve: !self.allow_unresolved_elements,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Command::Check { paths } => {
            let registry = load_paths(paths, cli.loader_options())?;
            println!("{} types ({})", registry.len(), cli.fhir_version);
            for (kind, count) in registry.kind_counts() {
                println!("  {:<18} {}", kind, count);
            }
            Ok(())
        }
        Command::Show {
            type_name,
            sources,
            inherited,
        } => {
            let registry = load_paths(sources, cli.loader_options())?;
            show_type(&registry, type_name, &cli.namespace, *inherited)
        }
        Command::Export { sources, output } => {
            let registry = load_paths(sources, cli.loader_options())?;
            let manifest = TypeManifest::from_registry(&registry, cli.namespace.clone());
            fs::write(output, manifest.to_json_string()?).map_err(|e| SchemaError::Io {
                path: output.clone(),
                source: e,
            })?;
            info!("Wrote {} types to {}", manifest.types.len(), output.display());
            Ok(())
        }
        #[cfg(feature = "download")]
        Command::Fetch { out } => {
            for path in atrius_fhir_types::fetch_definitions(cli.fhir_version, out)? {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

fn show_type(
    registry: &TypeRegistry,
    specifier: &str,
    namespace: &str,
    inherited: bool,
) -> Result<(), Box<dyn Error>> {
    let descriptor = registry
        .resolve_specifier(specifier, namespace)
        .ok_or_else(|| format!("Unknown type '{}'", specifier))?;
    let type_ref = descriptor.type_ref();

    println!("{} ({}{})", type_ref, descriptor.kind, if descriptor.is_abstract { ", abstract" } else { "" });
    if let Some(url) = &descriptor.url {
        println!("  url: {}", url);
    }
    let lineage: Vec<String> = registry
        .lineage(&type_ref)
        .iter()
        .map(|d| d.type_ref().to_string())
        .collect();
    println!("  lineage: {}", lineage.join(" -> "));

    let elements = if inherited {
        registry.all_elements(&type_ref)
    } else {
        descriptor.elements.iter().collect()
    };
    println!("  elements:");
    for element in elements {
        println!(
            "    {:<24} {}{}",
            element.name,
            element.type_ref,
            if element.is_list { " [*]" } else { "" }
        );
    }
    Ok(())
}
