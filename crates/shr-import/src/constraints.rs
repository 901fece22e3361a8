//! Reconstruction of path-addressed constraints from nested documents.
//!
//! A `constraints` document maps constraint-kind keys to records and the
//! special `subpaths` key to nested `constraints` documents keyed by field
//! FQN:
//!
//! ```text
//! {
//!   "card": {"min": 1, "max": 1},
//!   "subpaths": {
//!     "demo.Status": {"code": {"system": "urn:status", "code": "final"}}
//!   }
//! }
//! ```
//!
//! The walk is depth-first in document key order. Each leaf record yields one
//! constraint (several for the repeatable kinds) tagged with the accumulated
//! path of subpath keys.

use serde_json::Value as Json;
use shr_models::{
    BindingStrength, Cardinality, Constraint, ConstraintKind, ConstraintType, DiagnosticCode,
    Identifier, Logger,
};

use crate::document::{
    identifier_field, one_or_many, parse_cardinality, parse_concept, parse_identifier, str_field,
};

/// Key holding nested constraints keyed by field FQN.
pub const SUBPATHS_KEY: &str = "subpaths";

/// Walks a `constraints` document, appending to `out` in document order.
///
/// Unknown keys are reported as `UnknownConstraintKind` and skipped.
pub fn import_constraints(
    doc: &Json,
    path: &mut Vec<Identifier>,
    out: &mut Vec<Constraint>,
    logger: &mut Logger<'_>,
) {
    let Some(map) = doc.as_object() else {
        logger.report(DiagnosticCode::MalformedConstraint, &[("record", "constraints")]);
        return;
    };

    for (key, record) in map {
        if key == SUBPATHS_KEY {
            import_subpaths(record, path, out, logger);
            continue;
        }
        match ConstraintType::from_key(key) {
            Some(kind) => out.extend(import_constraint_record(kind, record, path, logger)),
            None => logger.report(DiagnosticCode::UnknownConstraintKind, &[("key", key.as_str())]),
        }
    }
}

fn import_subpaths(
    doc: &Json,
    path: &mut Vec<Identifier>,
    out: &mut Vec<Constraint>,
    logger: &mut Logger<'_>,
) {
    let Some(map) = doc.as_object() else {
        logger.report(DiagnosticCode::MalformedConstraint, &[("record", SUBPATHS_KEY)]);
        return;
    };

    for (fqn, nested) in map {
        let Some(step) = parse_identifier(fqn, logger) else {
            continue;
        };
        path.push(step);
        import_constraints(nested, path, out, logger);
        path.pop();
    }
}

/// Builds the constraints one record of `kind` describes.
///
/// Repeatable kinds accept a single record or an array; every other kind
/// yields at most one constraint.
pub fn import_constraint_record(
    kind: ConstraintType,
    record: &Json,
    path: &[Identifier],
    logger: &mut Logger<'_>,
) -> Vec<Constraint> {
    let records = if kind.is_repeatable() {
        one_or_many(record)
    } else {
        vec![record]
    };

    records
        .into_iter()
        .filter_map(|r| {
            let constraint_kind = constraint_kind(kind, r, logger)?;
            let mut constraint = Constraint::new(constraint_kind).at_path(path.to_vec());
            if let Some(source) = identifier_field(r, "lastModifiedBy", logger) {
                constraint = constraint.modified_by(source);
            }
            Some(constraint)
        })
        .collect()
}

fn constraint_kind(
    kind: ConstraintType,
    record: &Json,
    logger: &mut Logger<'_>,
) -> Option<ConstraintKind> {
    match kind {
        ConstraintType::Card => parse_cardinality(record, logger).map(ConstraintKind::Card),
        ConstraintType::ValueSet => value_set_kind(record, logger),
        ConstraintType::FixedCode => {
            parse_concept(record, DiagnosticCode::MalformedConstraint, logger)
                .map(ConstraintKind::FixedCode)
        }
        ConstraintType::IncludesCode => {
            parse_concept(record, DiagnosticCode::MalformedConstraint, logger)
                .map(ConstraintKind::IncludesCode)
        }
        ConstraintType::Type => {
            let is_a = required_identifier(record, kind, logger)?;
            let on_value = record.get("onValue").and_then(Json::as_bool).unwrap_or(false);
            Some(ConstraintKind::Type { is_a, on_value })
        }
        ConstraintType::IncludesType => {
            let is_a = required_identifier(record, kind, logger)?;
            let cardinality = match record.get("card") {
                Some(card) => parse_cardinality(card, logger)?,
                None => Cardinality::zero_or_more(),
            };
            Some(ConstraintKind::IncludesType { is_a, cardinality })
        }
        ConstraintType::Boolean => match record.get("value").and_then(Json::as_bool) {
            Some(value) => Some(ConstraintKind::Boolean(value)),
            None => {
                logger.report(DiagnosticCode::MalformedConstraint, &[("key", kind.key())]);
                None
            }
        },
    }
}

fn value_set_kind(record: &Json, logger: &mut Logger<'_>) -> Option<ConstraintKind> {
    let Some(url) = str_field(record, "uri").or_else(|| str_field(record, "url")) else {
        logger.report(
            DiagnosticCode::MalformedConstraint,
            &[("key", ConstraintType::ValueSet.key())],
        );
        return None;
    };

    let binding_strength = match str_field(record, "bindingStrength") {
        None => BindingStrength::default(),
        Some(name) => match BindingStrength::from_name(name) {
            Some(strength) => strength,
            None => {
                logger.report(
                    DiagnosticCode::MalformedConstraint,
                    &[("bindingStrength", name)],
                );
                return None;
            }
        },
    };

    Some(ConstraintKind::ValueSet {
        url: url.to_string(),
        binding_strength,
    })
}

fn required_identifier(
    record: &Json,
    kind: ConstraintType,
    logger: &mut Logger<'_>,
) -> Option<Identifier> {
    match str_field(record, "fqn") {
        Some(fqn) => parse_identifier(fqn, logger),
        None => {
            logger.report(DiagnosticCode::MalformedConstraint, &[("key", kind.key())]);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shr_models::{Concept, Diagnostics};

    fn walk(doc: Json) -> (Vec<Constraint>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut out = Vec::new();
        {
            let mut logger = Logger::new(&mut diagnostics);
            import_constraints(&doc, &mut Vec::new(), &mut out, &mut logger);
        }
        (out, diagnostics)
    }

    #[test]
    fn test_subpath_card() {
        let (constraints, diagnostics) =
            walk(json!({"subpaths": {"A.b": {"card": {"min": 1, "max": 1}}}}));

        assert!(diagnostics.is_empty());
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].kind, ConstraintKind::Card(Cardinality::exactly_one()));
        assert_eq!(constraints[0].path, vec![Identifier::new("A", "b")]);
    }

    #[test]
    fn test_nested_subpaths_concatenate() {
        let (constraints, _) = walk(json!({
            "boolean": {"value": true},
            "subpaths": {
                "demo.Outer": {
                    "subpaths": {
                        "demo.Inner": {"type": {"fqn": "demo.Narrow", "onValue": true}}
                    },
                    "card": {"min": 0, "max": 1}
                }
            }
        }));

        assert_eq!(constraints.len(), 3);
        assert!(constraints[0].is_own());
        assert_eq!(constraints[1].path_string(), "demo:Outer:demo:Inner");
        assert_eq!(
            constraints[1].kind,
            ConstraintKind::Type {
                is_a: Identifier::new("demo", "Narrow"),
                on_value: true
            }
        );
        assert_eq!(constraints[2].path_string(), "demo:Outer");
    }

    #[test]
    fn test_unknown_key_is_reported_and_skipped() {
        let (constraints, diagnostics) = walk(json!({
            "mystery": {"value": 1},
            "boolean": {"value": false}
        }));

        assert_eq!(constraints.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.count(DiagnosticCode::UnknownConstraintKind), 1);
        assert_eq!(diagnostics.iter().next().unwrap().get("key"), Some("mystery"));
    }

    #[test]
    fn test_includes_code_single_and_array() {
        let (single, _) = walk(json!({"includesCode": {"system": "urn:x", "code": "a"}}));
        assert_eq!(single.len(), 1);

        let (many, _) = walk(json!({"includesCode": [
            {"system": "urn:x", "code": "a"},
            {"system": "urn:x", "code": "b", "lastModifiedBy": "demo.Child"}
        ]}));
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].kind, ConstraintKind::IncludesCode(Concept::new("urn:x", "b")));
        assert_eq!(many[1].last_modified_by, Some(Identifier::new("demo", "Child")));
    }

    #[test]
    fn test_includes_type_card_defaults_to_unbounded() {
        let (constraints, _) = walk(json!({"includesType": [
            {"fqn": "demo.A", "card": {"min": 1, "max": 1}},
            {"fqn": "demo.B"}
        ]}));

        assert_eq!(constraints.len(), 2);
        match &constraints[1].kind {
            ConstraintKind::IncludesType { cardinality, .. } => {
                assert_eq!(*cardinality, Cardinality::zero_or_more())
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_value_set_uri_or_url_and_binding() {
        let (constraints, diagnostics) = walk(json!({
            "valueSet": {"url": "http://example.org/vs", "bindingStrength": "EXTENSIBLE"}
        }));
        assert!(diagnostics.is_empty());
        assert_eq!(
            constraints[0].kind,
            ConstraintKind::ValueSet {
                url: "http://example.org/vs".to_string(),
                binding_strength: BindingStrength::Extensible
            }
        );

        let (constraints, diagnostics) = walk(json!({"valueSet": {"bindingStrength": "REQUIRED"}}));
        assert!(constraints.is_empty());
        assert_eq!(diagnostics.count(DiagnosticCode::MalformedConstraint), 1);
    }

    #[test]
    fn test_invalid_subpath_key_skips_subtree() {
        let (constraints, diagnostics) = walk(json!({"subpaths": {
            "NoSeparator": {"boolean": {"value": true}},
            "demo.Ok": {"boolean": {"value": true}}
        }}));

        assert_eq!(constraints.len(), 1);
        assert_eq!(diagnostics.count(DiagnosticCode::InvalidIdentifier), 1);
    }
}
