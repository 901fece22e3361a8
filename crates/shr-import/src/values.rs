//! Value reconstruction: the `valueType`-tagged records of fields and
//! element values.

use serde_json::Value as Json;
use shr_models::{
    Cardinality, CardinalityHistoryEntry, Constraint, ConstraintHistory, ConstraintHistoryEntry,
    ConstraintKind, ConstraintType, DiagnosticCode, Identifier, Logger, Value, ValueKind,
    ValueType,
};

use crate::constraints::{import_constraint_record, import_constraints};
use crate::document::{
    array_field, bool_field, one_or_many, parse_cardinality, parse_identifier,
    parse_inheritance, str_field,
};

/// Builds a [`Value`] from its canonical record.
///
/// Returns `None`, after reporting, when the tag is missing or unknown or the
/// record lacks its identifier.
pub fn import_value(doc: &Json, logger: &mut Logger<'_>) -> Option<Value> {
    let Some(tag) = str_field(doc, "valueType") else {
        logger.report(DiagnosticCode::MalformedValue, &[("reason", "valueType")]);
        return None;
    };
    let Some(value_type) = ValueType::from_tag(tag) else {
        logger.report(DiagnosticCode::UnknownValueType, &[("valueType", tag)]);
        return None;
    };

    let kind = match value_type {
        ValueType::Identifiable => ValueKind::Identifiable(value_identifier(doc, tag, logger)?),
        ValueType::Reference => ValueKind::Reference(value_identifier(doc, tag, logger)?),
        ValueType::Incomplete => ValueKind::Incomplete(value_identifier(doc, tag, logger)?),
        ValueType::Unresolved => ValueKind::Unresolved(tbd_text(str_field(doc, "fqn").unwrap_or(""))),
        ValueType::Choice => ValueKind::Choice(
            array_field(doc, "options")
                .iter()
                .filter_map(|option| import_value(option, logger))
                .collect(),
        ),
    };
    let mut value = Value::new(kind);

    if let Some(card_doc) = doc.get("card") {
        if let Some((card, synthetic)) = import_card(card_doc, logger) {
            value.card = Some(card);
            value.constraints.extend(synthetic);
        }
    }
    if let Some(constraints) = doc.get("constraints") {
        import_constraints(constraints, &mut Vec::new(), &mut value.constraints, logger);
    }
    if let Some(inheritance) = doc.get("inheritance") {
        value.inheritance = parse_inheritance(inheritance, logger);
    }
    if let Some(history) = doc.get("constraintHistory") {
        value.constraint_history = import_constraint_history(history, logger);
    }

    Some(value)
}

fn value_identifier(doc: &Json, tag: &str, logger: &mut Logger<'_>) -> Option<Identifier> {
    match str_field(doc, "fqn") {
        Some(fqn) => parse_identifier(fqn, logger),
        None => {
            logger.report(DiagnosticCode::MalformedValue, &[("valueType", tag), ("reason", "fqn")]);
            None
        }
    }
}

/// Extracts the text of a TBD placeholder.
///
/// `TBD(Some text)` yields `Some text`; without parentheses the whole text
/// minus a leading `TBD` is used.
pub fn tbd_text(fqn: &str) -> String {
    if let (Some(open), Some(close)) = (fqn.find('('), fqn.rfind(')')) {
        if open < close {
            return fqn[open + 1..close].to_string();
        }
    }
    fqn.strip_prefix("TBD").unwrap_or(fqn).trim().to_string()
}

/// Reads a card record.
///
/// Without history the card is taken as-is. With history, the current card
/// is the first readable entry, the card history holds every readable entry,
/// and a `Card` constraint is synthesized from the last one, attributed to its
/// source. Unreadable entries are reported once and dropped, so the card
/// falls to the next readable entry; when none is readable the record's own
/// `min`/`max` is used.
fn import_card(doc: &Json, logger: &mut Logger<'_>) -> Option<(Cardinality, Option<Constraint>)> {
    let mut entries = Vec::new();
    for item in array_field(doc, "history") {
        let Some(cardinality) = parse_cardinality(item, logger) else {
            continue;
        };
        let Some(source) = history_source(item, DiagnosticCode::MalformedCardinality, logger)
        else {
            continue;
        };
        entries.push(CardinalityHistoryEntry { cardinality, source });
    }

    let (Some(first), Some(last)) = (entries.first().cloned(), entries.last().cloned()) else {
        return parse_cardinality(doc, logger).map(|card| (card, None));
    };

    let synthetic =
        Constraint::new(ConstraintKind::Card(last.cardinality)).modified_by(last.source);
    Some((first.cardinality.with_history(entries), Some(synthetic)))
}

/// Reads `{kind: [item]}`, re-running each item through constraint
/// reconstruction with an empty path.
fn import_constraint_history(doc: &Json, logger: &mut Logger<'_>) -> Option<ConstraintHistory> {
    let Some(map) = doc.as_object() else {
        logger.report(DiagnosticCode::MalformedConstraint, &[("record", "constraintHistory")]);
        return None;
    };

    let mut history = ConstraintHistory::new();
    for (key, items) in map {
        let Some(kind) = ConstraintType::from_key(key) else {
            logger.report(DiagnosticCode::UnknownConstraintKind, &[("key", key.as_str())]);
            continue;
        };
        for item in one_or_many(items) {
            let Some(source) = history_source(item, DiagnosticCode::MalformedConstraint, logger)
            else {
                continue;
            };
            let overridden = bool_field(item, "overridden");
            for constraint in import_constraint_record(kind, item, &[], logger) {
                history.push(ConstraintHistoryEntry {
                    constraint,
                    source: source.clone(),
                    overridden,
                });
            }
        }
    }
    Some(history)
}

/// Reads a history item's `source`, reporting `missing` when it is absent.
/// An unreadable FQN is reported by the identifier parser alone.
fn history_source(
    item: &Json,
    missing: DiagnosticCode,
    logger: &mut Logger<'_>,
) -> Option<Identifier> {
    match str_field(item, "source") {
        Some(text) => parse_identifier(text, logger),
        None => {
            logger.report(missing, &[("reason", "source")]);
            None
        }
    }
}
