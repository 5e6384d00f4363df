//! Name and path helpers shared by the type-table builder.

/// Capitalizes the first letter of a string.
///
/// # Examples
///
/// ```
/// # use atrius_fhir_types::format_helpers::capitalize_first_letter;
/// assert_eq!(capitalize_first_letter("humanName"), "HumanName");
/// assert_eq!(capitalize_first_letter(""), "");
/// ```
pub fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Generates the name of a synthesized backbone type from a FHIR element path.
///
/// The first path segment is kept as-is and every following segment is
/// capitalized and appended.
///
/// # Examples
///
/// - "Patient" → "Patient"
/// - "Patient.contact" → "PatientContact"
/// - "Questionnaire.item.answerOption" → "QuestionnaireItemAnswerOption"
pub fn backbone_type_name(path: &str) -> String {
    let mut parts = path.split('.');
    let mut result = parts.next().unwrap_or_default().to_string();
    for part in parts {
        result.push_str(&capitalize_first_letter(part));
    }
    result
}

/// Extracts the element id from a contentReference value.
///
/// Handles local references (`#Questionnaire.item`) and canonical references
/// with a fragment. Returns `None` when there is no fragment.
pub fn extract_content_reference_id(content_ref: &str) -> Option<&str> {
    let (_, fragment) = content_ref.split_once('#')?;
    if fragment.is_empty() {
        None
    } else {
        Some(fragment)
    }
}

/// Name of one expanded choice element: `value` + `Quantity` → `valueQuantity`.
pub fn choice_element_name(base_name: &str, type_code: &str) -> String {
    format!("{}{}", base_name, capitalize_first_letter(type_code))
}

/// Last path segment of a canonical URL
/// (`http://hl7.org/fhir/StructureDefinition/DomainResource` → `DomainResource`).
pub fn canonical_tail(url: &str) -> &str {
    let without_version = url.split('|').next().unwrap_or(url);
    without_version
        .rsplit('/')
        .next()
        .unwrap_or(without_version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backbone_type_name() {
        assert_eq!(backbone_type_name("Patient"), "Patient");
        assert_eq!(backbone_type_name("Patient.contact"), "PatientContact");
        assert_eq!(
            backbone_type_name("Questionnaire.item.answerOption"),
            "QuestionnaireItemAnswerOption"
        );
    }

    #[test]
    fn test_extract_content_reference_id() {
        assert_eq!(
            extract_content_reference_id("#Questionnaire.item"),
            Some("Questionnaire.item")
        );
        assert_eq!(
            extract_content_reference_id(
                "http://hl7.org/fhir/StructureDefinition/Questionnaire#Questionnaire.item"
            ),
            Some("Questionnaire.item")
        );
        assert_eq!(extract_content_reference_id("Questionnaire.item"), None);
        assert_eq!(extract_content_reference_id("#"), None);
    }

    #[test]
    fn test_canonical_tail() {
        assert_eq!(
            canonical_tail("http://hl7.org/fhir/StructureDefinition/DomainResource"),
            "DomainResource"
        );
        assert_eq!(
            canonical_tail("http://hl7.org/fhir/StructureDefinition/Element|5.0.0"),
            "Element"
        );
        assert_eq!(canonical_tail("Base"), "Base");
    }

    #[test]
    fn test_choice_element_name() {
        assert_eq!(choice_element_name("value", "Quantity"), "valueQuantity");
        assert_eq!(choice_element_name("deceased", "boolean"), "deceasedBoolean");
    }
}
