//! Element mapping construction.

use serde_json::Value as Json;
use shr_models::{DiagnosticCode, ElementMapping, Logger, MappingRule, MappingRuleKind};

use crate::document::{
    entity_identifier, identifier_field, identifier_list, one_or_many, parse_cardinality,
    parse_inheritance, require_str, str_field,
};
use crate::error::ImportResult;

/// Accumulates [`ElementMapping`]s from `Mapping` documents.
#[derive(Debug, Clone, Default)]
pub struct MappingImporter {
    mappings: Vec<ElementMapping>,
}

impl MappingImporter {
    /// Creates an empty importer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one document.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when `namespace`, `name` or `targetSpec` is
    /// absent.
    pub fn add(&mut self, doc: &Json, logger: &mut Logger<'_>) -> ImportResult<()> {
        let source = entity_identifier(doc, "Mapping")?;
        let target_spec = require_str(doc, "targetSpec", &format!("Mapping {}", source))?;
        let mut logger = logger.child("mapping", source.fqn());
        let mut logger = logger.child("targetSpec", target_spec);

        let mut mapping = ElementMapping::new(source, target_spec);
        mapping.target_item = str_field(doc, "targetItem").map(str::to_string);
        if let Some(inheritance) = doc.get("inheritance") {
            mapping.inheritance = parse_inheritance(inheritance, &mut logger);
        }

        if let Some(rules) = doc.get("rules") {
            match rules.as_object() {
                Some(groups) => {
                    for (group, records) in groups {
                        import_rule_group(group, records, &mut mapping.rules, &mut logger);
                    }
                }
                None => logger.report(DiagnosticCode::MalformedMappingRule, &[("reason", "rules")]),
            }
        }

        self.mappings.push(mapping);
        Ok(())
    }

    /// Mappings read so far.
    pub fn mappings(&self) -> &[ElementMapping] {
        &self.mappings
    }

    /// Consumes the importer.
    pub fn into_mappings(self) -> Vec<ElementMapping> {
        self.mappings
    }
}

fn import_rule_group(
    group: &str,
    records: &Json,
    out: &mut Vec<MappingRule>,
    logger: &mut Logger<'_>,
) {
    let reader: fn(&Json, &mut Logger<'_>) -> Option<MappingRuleKind> = match group {
        "fieldMapping" => field_mapping,
        "cardMapping" => card_mapping,
        "fixedValueMapping" => fixed_value_mapping,
        other => {
            logger.report(DiagnosticCode::UnknownMappingRule, &[("rule", other)]);
            return;
        }
    };

    for record in one_or_many(records) {
        let Some(kind) = reader(record, logger) else {
            continue;
        };
        let mut rule = MappingRule::new(kind);
        rule.last_modified_by = identifier_field(record, "lastModifiedBy", logger);
        out.push(rule);
    }
}

fn target(record: &Json, rule: &str, logger: &mut Logger<'_>) -> Option<String> {
    match str_field(record, "target") {
        Some(target) => Some(target.to_string()),
        None => {
            logger.report(
                DiagnosticCode::MalformedMappingRule,
                &[("rule", rule), ("reason", "target")],
            );
            None
        }
    }
}

fn field_mapping(record: &Json, logger: &mut Logger<'_>) -> Option<MappingRuleKind> {
    let source_path = identifier_list(record, "sourcePath", logger);
    if source_path.is_empty() {
        logger.report(
            DiagnosticCode::MalformedMappingRule,
            &[("rule", "fieldMapping"), ("reason", "sourcePath")],
        );
        return None;
    }
    let target = target(record, "fieldMapping", logger)?;
    Some(MappingRuleKind::Field {
        source_path,
        target,
    })
}

fn card_mapping(record: &Json, logger: &mut Logger<'_>) -> Option<MappingRuleKind> {
    let target = target(record, "cardMapping", logger)?;
    let Some(card) = record.get("card") else {
        logger.report(
            DiagnosticCode::MalformedMappingRule,
            &[("rule", "cardMapping"), ("reason", "card")],
        );
        return None;
    };
    let cardinality = parse_cardinality(card, logger)?;
    Some(MappingRuleKind::Cardinality {
        target,
        cardinality,
    })
}

fn fixed_value_mapping(record: &Json, logger: &mut Logger<'_>) -> Option<MappingRuleKind> {
    let target = target(record, "fixedValueMapping", logger)?;
    let value = match record.get("value") {
        Some(Json::String(s)) => s.clone(),
        Some(v @ (Json::Number(_) | Json::Bool(_))) => v.to_string(),
        _ => {
            logger.report(
                DiagnosticCode::MalformedMappingRule,
                &[("rule", "fixedValueMapping"), ("reason", "value")],
            );
            return None;
        }
    };
    Some(MappingRuleKind::FixedValue { target, value })
}
