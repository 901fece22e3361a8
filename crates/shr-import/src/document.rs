//! Field accessors over canonical JSON documents.
//!
//! Every helper here either returns the typed field or reports a diagnostic
//! and returns `None`; only [`entity_identifier`] and [`require_str`] raise
//! fatal errors.

use serde_json::Value as Json;
use shr_models::{
    Cardinality, Concept, DiagnosticCode, Identifier, Inheritance, InheritanceStatus, Logger,
};

use crate::error::{ImportError, ImportResult};

/// Returns a string field, if present and a string.
pub(crate) fn str_field<'a>(doc: &'a Json, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Json::as_str)
}

/// Returns a boolean field, `false` when absent.
pub(crate) fn bool_field(doc: &Json, key: &str) -> bool {
    doc.get(key).and_then(Json::as_bool).unwrap_or(false)
}

/// Returns an array field, empty when absent or not an array.
pub(crate) fn array_field<'a>(doc: &'a Json, key: &str) -> &'a [Json] {
    doc.get(key)
        .and_then(Json::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Returns a non-empty string field or a `MissingField` error.
pub(crate) fn require_str<'a>(
    doc: &'a Json,
    field: &'static str,
    context: &str,
) -> ImportResult<&'a str> {
    match str_field(doc, field) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ImportError::MissingField {
            field,
            context: context.to_string(),
        }),
    }
}

/// Reads the `{namespace, name}` pair identifying an entity document.
pub(crate) fn entity_identifier(doc: &Json, file_type: &str) -> ImportResult<Identifier> {
    let namespace = require_str(doc, "namespace", file_type)?;
    let context = format!("{} in namespace {}", file_type, namespace);
    let name = require_str(doc, "name", &context)?;
    Ok(Identifier::new(namespace, name))
}

/// Normalizes a single record or an array of records into a list.
pub(crate) fn one_or_many(value: &Json) -> Vec<&Json> {
    match value {
        Json::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Parses an FQN string, reporting `InvalidIdentifier` on failure.
pub(crate) fn parse_identifier(text: &str, logger: &mut Logger<'_>) -> Option<Identifier> {
    match Identifier::parse_fqn(text) {
        Ok(id) => Some(id),
        Err(_) => {
            logger.report(DiagnosticCode::InvalidIdentifier, &[("fqn", text)]);
            None
        }
    }
}

/// Parses an optional FQN field.
pub(crate) fn identifier_field(
    doc: &Json,
    key: &str,
    logger: &mut Logger<'_>,
) -> Option<Identifier> {
    str_field(doc, key).and_then(|text| parse_identifier(text, logger))
}

/// Parses a list of FQN strings, dropping the unreadable ones.
pub(crate) fn identifier_list(doc: &Json, key: &str, logger: &mut Logger<'_>) -> Vec<Identifier> {
    array_field(doc, key)
        .iter()
        .filter_map(|item| match item.as_str() {
            Some(text) => parse_identifier(text, logger),
            None => {
                logger.report(DiagnosticCode::InvalidIdentifier, &[("field", key)]);
                None
            }
        })
        .collect()
}

/// Parses `{system, code, display?}`, reporting `malformed` when either is missing.
pub(crate) fn parse_concept(
    doc: &Json,
    malformed: DiagnosticCode,
    logger: &mut Logger<'_>,
) -> Option<Concept> {
    let (Some(system), Some(code)) = (str_field(doc, "system"), str_field(doc, "code")) else {
        logger.report(malformed, &[("record", "concept")]);
        return None;
    };
    let mut concept = Concept::new(system, code);
    if let Some(display) = str_field(doc, "display") {
        concept = concept.with_display(display);
    }
    Some(concept)
}

/// Parses a list of concepts under `key`; unreadable entries are reported as
/// `MalformedConcept` and dropped.
pub(crate) fn concept_list(doc: &Json, key: &str, logger: &mut Logger<'_>) -> Vec<Concept> {
    array_field(doc, key)
        .iter()
        .filter_map(|c| parse_concept(c, DiagnosticCode::MalformedConcept, logger))
        .collect()
}

/// Parses `{min, max?}` where `max` is an integer, `"*"`, `null` or absent.
///
/// History is not read here; see the value reader.
pub(crate) fn parse_cardinality(doc: &Json, logger: &mut Logger<'_>) -> Option<Cardinality> {
    let Some(min) = doc.get("min").and_then(Json::as_u64) else {
        logger.report(DiagnosticCode::MalformedCardinality, &[("reason", "min")]);
        return None;
    };
    let max = match doc.get("max") {
        None | Some(Json::Null) => None,
        Some(Json::String(s)) if s == "*" => None,
        Some(other) => match other.as_u64() {
            Some(max) => Some(max),
            None => {
                logger.report(DiagnosticCode::MalformedCardinality, &[("reason", "max")]);
                return None;
            }
        },
    };

    let (Ok(min), Ok(max)) = (u32::try_from(min), max.map(u32::try_from).transpose()) else {
        logger.report(DiagnosticCode::MalformedCardinality, &[("reason", "range")]);
        return None;
    };
    match Cardinality::new(min, max) {
        Ok(card) => Some(card),
        Err(_) => {
            logger.report(DiagnosticCode::MalformedCardinality, &[("reason", "inverted")]);
            None
        }
    }
}

/// Parses `{status, from}`.
pub(crate) fn parse_inheritance(doc: &Json, logger: &mut Logger<'_>) -> Option<Inheritance> {
    let status = str_field(doc, "status").and_then(InheritanceStatus::from_name);
    let from = identifier_field(doc, "from", logger);
    match (status, from) {
        (Some(status), Some(from)) => Some(Inheritance { status, from }),
        _ => {
            logger.report(DiagnosticCode::MalformedValue, &[("record", "inheritance")]);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shr_models::Diagnostics;

    #[test]
    fn test_parse_cardinality_forms() {
        let mut diagnostics = Diagnostics::new();
        let mut logger = Logger::new(&mut diagnostics);

        let bounded = parse_cardinality(&json!({"min": 0, "max": 1}), &mut logger).unwrap();
        assert_eq!(bounded.max(), Some(1));
        let star = parse_cardinality(&json!({"min": 1, "max": "*"}), &mut logger).unwrap();
        assert_eq!(star.max(), None);
        let null = parse_cardinality(&json!({"min": 0, "max": null}), &mut logger).unwrap();
        assert_eq!(null.max(), None);
        let absent = parse_cardinality(&json!({"min": 2}), &mut logger).unwrap();
        assert_eq!(absent.to_string(), "2..*");

        drop(logger);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_parse_cardinality_rejects_inverted_and_missing_min() {
        let mut diagnostics = Diagnostics::new();
        let mut logger = Logger::new(&mut diagnostics);

        assert!(parse_cardinality(&json!({"min": 2, "max": 1}), &mut logger).is_none());
        assert!(parse_cardinality(&json!({"max": 1}), &mut logger).is_none());
        assert!(parse_cardinality(&json!({"min": 0, "max": "many"}), &mut logger).is_none());

        drop(logger);
        assert_eq!(diagnostics.count(DiagnosticCode::MalformedCardinality), 3);
    }

    #[test]
    fn test_entity_identifier_requires_namespace_and_name() {
        let id = entity_identifier(&json!({"namespace": "demo", "name": "Foo"}), "DataElement")
            .unwrap();
        assert_eq!(id, Identifier::new("demo", "Foo"));

        let err = entity_identifier(&json!({"name": "Foo"}), "DataElement").unwrap_err();
        assert!(matches!(err, ImportError::MissingField { field: "namespace", .. }));

        let err = entity_identifier(&json!({"namespace": "demo", "name": ""}), "ValueSet")
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingField { field: "name", .. }));
    }

    #[test]
    fn test_one_or_many() {
        let single = json!({"system": "urn:x", "code": "a"});
        assert_eq!(one_or_many(&single).len(), 1);
        let many = json!([{"code": "a"}, {"code": "b"}]);
        assert_eq!(one_or_many(&many).len(), 2);
    }

    #[test]
    fn test_identifier_list_skips_bad_entries() {
        let mut diagnostics = Diagnostics::new();
        let mut logger = Logger::new(&mut diagnostics);
        let ids = identifier_list(&json!({"basedOn": ["demo.Base", "Nope", 3]}), "basedOn", &mut logger);
        drop(logger);

        assert_eq!(ids, vec![Identifier::new("demo", "Base")]);
        assert_eq!(diagnostics.count(DiagnosticCode::InvalidIdentifier), 2);
    }
}
