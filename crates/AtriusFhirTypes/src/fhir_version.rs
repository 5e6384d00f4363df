use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Enumeration of supported FHIR specification versions.
///
/// The version selects which published definitions the loader expects and
/// where `fetch` downloads them from. The registry records it so callers can
/// tell which release a table describes.
///
/// # Version Status
///
/// - **R4** (4.0.1): Normative version, widely adopted in production
/// - **R4B** (4.3.0): Intermediate release
/// - **R5** (5.0.0): Current release, the default
/// - **R6**: Draft version published on the HL7 build server
///
/// # Examples
///
/// ```rust
/// use atrius_fhir_types::FhirVersion;
///
/// let version: FhirVersion = "R5".parse().unwrap();
/// assert_eq!(version, FhirVersion::default());
/// assert_eq!(version.to_string(), "R5");
/// assert_eq!(version.fhir_release(), "5.0.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FhirVersion {
    /// FHIR 4.0.1 (normative)
    R4,
    /// FHIR 4.3.0
    R4B,
    /// FHIR 5.0.0
    #[default]
    R5,
    /// FHIR 6.0.0 (draft)
    R6,
}

impl FhirVersion {
    pub const ALL: [FhirVersion; 4] = [
        FhirVersion::R4,
        FhirVersion::R4B,
        FhirVersion::R5,
        FhirVersion::R6,
    ];

    /// Returns the string representation of the FHIR version ("R4", "R5", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "R4",
            FhirVersion::R4B => "R4B",
            FhirVersion::R5 => "R5",
            FhirVersion::R6 => "R6",
        }
    }

    /// The `fhirVersion` value StructureDefinitions of this release carry.
    pub fn fhir_release(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "4.0.1",
            FhirVersion::R4B => "4.3.0",
            FhirVersion::R5 => "5.0.0",
            FhirVersion::R6 => "6.0.0-ballot",
        }
    }

    /// Whether a StructureDefinition `fhirVersion` belongs to this release.
    ///
    /// Only major and minor are compared, so `5.0.0-snapshot1` matches R5.
    pub fn matches_release(&self, release: &str) -> bool {
        let major_minor = |v: &str| -> String { v.split('.').take(2).collect::<Vec<_>>().join(".") };
        major_minor(self.fhir_release()) == major_minor(release)
    }

    /// Location of the zipped JSON definitions for this release.
    pub fn definitions_url(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "https://hl7.org/fhir/R4/definitions.json.zip",
            FhirVersion::R4B => "https://hl7.org/fhir/R4B/definitions.json.zip",
            FhirVersion::R5 => "https://hl7.org/fhir/R5/definitions.json.zip",
            FhirVersion::R6 => "https://build.fhir.org/definitions.json.zip",
        }
    }
}

impl fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FhirVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FhirVersion::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s) || v.fhir_release() == s)
            .ok_or_else(|| format!("unknown FHIR version: {}", s))
    }
}

/// Implements `clap::ValueEnum` so the version can be used directly as a
/// command-line argument.
impl clap::ValueEnum for FhirVersion {
    fn value_variants<'a>() -> &'a [Self] {
        &FhirVersion::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("r4b".parse::<FhirVersion>(), Ok(FhirVersion::R4B));
        assert_eq!("5.0.0".parse::<FhirVersion>(), Ok(FhirVersion::R5));
        assert!("R3".parse::<FhirVersion>().is_err());
    }

    #[test]
    fn test_matches_release() {
        assert!(FhirVersion::R5.matches_release("5.0.0"));
        assert!(FhirVersion::R5.matches_release("5.0.0-snapshot1"));
        assert!(!FhirVersion::R5.matches_release("4.0.1"));
    }
}
