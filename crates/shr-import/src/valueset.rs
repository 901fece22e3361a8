//! Value set and code system construction.

use serde_json::Value as Json;
use shr_models::{CodeSystem, Concept, DiagnosticCode, Logger, ValueSet, ValueSetRule};

use crate::document::{array_field, concept_list, entity_identifier, parse_concept, str_field};
use crate::error::ImportResult;

/// Accumulates [`ValueSet`]s and [`CodeSystem`]s.
#[derive(Debug, Clone, Default)]
pub struct ValueSetImporter {
    value_sets: Vec<ValueSet>,
    code_systems: Vec<CodeSystem>,
}

impl ValueSetImporter {
    /// Creates an empty importer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one `ValueSet` document.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when `namespace` or `name` is absent.
    pub fn add(&mut self, doc: &Json, logger: &mut Logger<'_>) -> ImportResult<()> {
        let identifier = entity_identifier(doc, "ValueSet")?;
        let mut logger = logger.child("valueSet", identifier.fqn());

        let mut value_set = ValueSet::new(identifier, str_field(doc, "url").unwrap_or_default());
        value_set.description = str_field(doc, "description").map(str::to_string);
        value_set.concepts = concept_list(doc, "concepts", &mut logger);
        value_set.rules = array_field(doc, "rules")
            .iter()
            .filter_map(|rule| import_rule(rule, &mut logger))
            .collect();

        self.value_sets.push(value_set);
        Ok(())
    }

    /// Reads one `CodeSystem` document.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when `namespace` or `name` is absent.
    pub fn add_code_system(&mut self, doc: &Json, logger: &mut Logger<'_>) -> ImportResult<()> {
        let identifier = entity_identifier(doc, "CodeSystem")?;
        let mut logger = logger.child("codeSystem", identifier.fqn());

        let mut code_system = CodeSystem::new(identifier, str_field(doc, "url").unwrap_or_default());
        code_system.description = str_field(doc, "description").map(str::to_string);
        code_system.codes = concept_list(doc, "codes", &mut logger);

        self.code_systems.push(code_system);
        Ok(())
    }

    /// Value sets read so far.
    pub fn value_sets(&self) -> &[ValueSet] {
        &self.value_sets
    }

    /// Code systems read so far.
    pub fn code_systems(&self) -> &[CodeSystem] {
        &self.code_systems
    }

    /// Consumes the importer.
    pub fn into_parts(self) -> (Vec<ValueSet>, Vec<CodeSystem>) {
        (self.value_sets, self.code_systems)
    }
}

fn import_rule(doc: &Json, logger: &mut Logger<'_>) -> Option<ValueSetRule> {
    let Some(rule_type) = str_field(doc, "ruleType") else {
        logger.report(DiagnosticCode::MalformedValueSetRule, &[("reason", "ruleType")]);
        return None;
    };

    let constructor: fn(Concept) -> ValueSetRule = match rule_type {
        "IncludesCode" => ValueSetRule::IncludesCode,
        "IncludesDescendants" => ValueSetRule::IncludesDescendants,
        "ExcludesDescendants" => ValueSetRule::ExcludesDescendants,
        "IncludesFromCode" => ValueSetRule::IncludesFromCode,
        "IncludesFromCodeSystem" => {
            return match str_field(doc, "system") {
                Some(system) => Some(ValueSetRule::IncludesFromCodeSystem {
                    system: system.to_string(),
                }),
                None => {
                    logger.report(
                        DiagnosticCode::MalformedValueSetRule,
                        &[("ruleType", rule_type), ("reason", "system")],
                    );
                    None
                }
            };
        }
        other => {
            logger.report(DiagnosticCode::UnknownValueSetRule, &[("ruleType", other)]);
            return None;
        }
    };

    let Some(code) = doc.get("code") else {
        logger.report(
            DiagnosticCode::MalformedValueSetRule,
            &[("ruleType", rule_type), ("reason", "code")],
        );
        return None;
    };
    parse_concept(code, DiagnosticCode::MalformedValueSetRule, logger).map(constructor)
}
