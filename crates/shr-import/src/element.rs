//! Data element construction.

use serde_json::Value as Json;
use shr_models::{DataElement, DiagnosticCode, Logger, ValueType};

use crate::config::ImportConfig;
use crate::document::{
    array_field, bool_field, concept_list, entity_identifier, identifier_list, str_field,
};
use crate::error::ImportResult;
use crate::values::import_value;

/// Accumulates [`DataElement`]s from `DataElement` documents.
#[derive(Debug, Clone, Default)]
pub struct DataElementImporter {
    config: ImportConfig,
    elements: Vec<DataElement>,
}

impl DataElementImporter {
    /// Creates an importer using `config`.
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            elements: Vec::new(),
        }
    }

    /// Reads one document.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when `namespace` or `name` is absent. Every
    /// other problem is reported to `logger` and the offending part omitted.
    pub fn add(&mut self, doc: &Json, logger: &mut Logger<'_>) -> ImportResult<()> {
        let identifier = entity_identifier(doc, "DataElement")?;
        let mut logger = logger.child("element", identifier.fqn());

        let grammar_version = str_field(doc, "grammarVersion")
            .unwrap_or(self.config.default_grammar_version.as_str())
            .to_string();
        let mut element = DataElement::new(identifier, grammar_version);
        element.is_entry = bool_field(doc, "isEntry");
        element.is_abstract = bool_field(doc, "isAbstract");
        element.description = str_field(doc, "description").map(str::to_string);
        element.concepts = concept_list(doc, "concepts", &mut logger);
        element.based_on = identifier_list(doc, "basedOn", &mut logger);
        element.hierarchy = identifier_list(doc, "hierarchy", &mut logger);

        if let Some(value) = doc.get("value") {
            element.value = import_value(value, &mut logger);
        }

        for field_doc in array_field(doc, "fields") {
            let Some(field) = import_value(field_doc, &mut logger) else {
                continue;
            };
            if field.value_type() == ValueType::Choice {
                logger.report(DiagnosticCode::ChoiceField, &[("field", field.to_string().as_str())]);
                continue;
            }
            element.fields.push(field);
        }

        tracing::debug!(
            target: "shr",
            element = %element.identifier,
            fields = element.fields.len(),
            "imported data element"
        );
        self.elements.push(element);
        Ok(())
    }

    /// Elements read so far, in document order.
    pub fn elements(&self) -> &[DataElement] {
        &self.elements
    }

    /// Consumes the importer.
    pub fn into_elements(self) -> Vec<DataElement> {
        self.elements
    }
}
