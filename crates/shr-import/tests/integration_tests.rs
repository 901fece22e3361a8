//! Integration tests for document import.
//!
//! These tests feed whole document sets through the public `Importer` API.

use serde_json::{json, Value as Json};
use shr_import::{ImportError, Importer};
use shr_models::{
    Cardinality, ConstraintKind, ConstraintType, DiagnosticCode, Identifier, ModelError,
    ValueKind,
};

/// A small but realistic project: one namespace, a value set, a code system,
/// three elements and a mapping.
fn project_documents() -> Vec<Json> {
    vec![
        json!({
            "fileType": "ProjectInfo",
            "projectURL": "http://example.org/shr",
            "projectShorthand": "DEMO"
        }),
        json!({
            "fileType": "Namespace",
            "namespace": "demo",
            "description": "Demonstration elements",
            "grammarVersions": ["5.0"]
        }),
        json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Foo",
            "isEntry": true,
            "basedOn": ["demo.Base"],
            "hierarchy": ["demo.Base"],
            "value": {
                "valueType": "IdentifiableValue",
                "fqn": "demo.Bar",
                "card": {"min": 0, "max": 1}
            },
            "fields": [
                {
                    "valueType": "IdentifiableValue",
                    "fqn": "demo.Status",
                    "card": {"min": 1, "max": 1},
                    "constraints": {
                        "valueSet": {"uri": "http://example.org/shr/vs/demo/StatusVS", "bindingStrength": "REQUIRED"},
                        "subpaths": {
                            "demo.Coding": {
                                "code": {"system": "http://loinc.org", "code": "8310-5"},
                                "subpaths": {
                                    "demo.Display": {"boolean": {"value": true}}
                                }
                            }
                        }
                    }
                },
                {
                    "valueType": "RefValue",
                    "fqn": "demo.Author",
                    "card": {"min": 0, "max": "*"},
                    "inheritance": {"status": "inherited", "from": "demo.Base"}
                },
                {"valueType": "TBD", "fqn": "TBD(Reason for visit)"}
            ]
        }),
        json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Bar",
            "description": "A bar"
        }),
        json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Base",
            "isAbstract": true
        }),
        json!({
            "fileType": "ValueSet",
            "namespace": "demo",
            "name": "StatusVS",
            "url": "http://example.org/shr/vs/demo/StatusVS",
            "rules": [
                {"ruleType": "IncludesCode", "code": {"system": "http://example.org/shr/cs/demo/Status", "code": "final"}}
            ]
        }),
        json!({
            "fileType": "CodeSystem",
            "namespace": "demo",
            "name": "Status",
            "url": "http://example.org/shr/cs/demo/Status",
            "codes": [{"system": "http://example.org/shr/cs/demo/Status", "code": "final"}]
        }),
        json!({
            "fileType": "Mapping",
            "namespace": "demo",
            "name": "Foo",
            "targetSpec": "FHIR_R4",
            "targetItem": "Observation",
            "rules": {
                "fieldMapping": [{"sourcePath": ["demo.Status"], "target": "status"}]
            }
        }),
    ]
}

#[test]
fn test_full_project_import() {
    let mut importer = Importer::new();
    let errors = importer.add_all(&project_documents());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    let output = importer.into_specifications().unwrap();
    assert!(output.is_clean(), "unexpected diagnostics: {:?}", output.diagnostics);

    let specs = &output.specifications;
    assert_eq!(specs.namespaces.len(), 1);
    assert_eq!(specs.data_elements.len(), 3);
    assert_eq!(specs.value_sets.len(), 1);
    assert_eq!(specs.code_systems.len(), 1);
    assert_eq!(specs.maps.len(), 1);

    let info = output.project_info.unwrap();
    assert_eq!(info.project_url, "http://example.org/shr");
    assert_eq!(info.project_shorthand.as_deref(), Some("DEMO"));

    let entries: Vec<_> = specs.data_elements.entries().map(|e| e.identifier.name()).collect();
    assert_eq!(entries, vec!["Foo"]);
    assert!(specs
        .maps
        .find_by_target_and_source("FHIR_R4", &Identifier::new("demo", "Foo"))
        .is_some());
}

#[test]
fn test_two_element_scenario() {
    let mut importer = Importer::new();
    importer
        .add(&json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Foo",
            "value": {"valueType": "IdentifiableValue", "fqn": "demo.Bar", "card": {"min": 0, "max": 1}}
        }))
        .unwrap();
    importer
        .add(&json!({"fileType": "DataElement", "namespace": "demo", "name": "Bar"}))
        .unwrap();

    let specs = importer.into_specifications().unwrap().specifications;
    assert_eq!(specs.data_elements.len(), 2);

    let foo = specs.data_elements.find(&Identifier::new("demo", "Foo")).unwrap();
    let value = foo.value.as_ref().unwrap();
    assert_eq!(value.kind, ValueKind::Identifiable(Identifier::new("demo", "Bar")));
    assert_eq!(value.card, Some(Cardinality::zero_or_one()));
}

#[test]
fn test_subpath_constraint_paths() {
    let mut importer = Importer::new();
    importer.add_all(&project_documents());
    let specs = importer.into_specifications().unwrap().specifications;

    let foo = specs.data_elements.get("demo:Foo").unwrap();
    let status = foo.field(&Identifier::new("demo", "Status")).unwrap();

    let paths: Vec<_> = status.constraints.iter().map(|c| c.path_string()).collect();
    assert_eq!(paths, vec!["", "demo:Coding", "demo:Coding:demo:Display"]);
    assert_eq!(status.constraints_filter().own().value_set().len(), 1);
    assert_eq!(
        status.constraints[2].kind,
        ConstraintKind::Boolean(true)
    );
}

#[test]
fn test_unknown_constraint_kind_is_reported_not_fatal() {
    let mut importer = Importer::new();
    importer
        .add(&json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Foo",
            "fields": [{
                "valueType": "IdentifiableValue",
                "fqn": "demo.Bar",
                "constraints": {
                    "sparkle": {"level": 11},
                    "card": {"min": 1, "max": 1}
                }
            }]
        }))
        .unwrap();

    let output = importer.into_specifications().unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    let diagnostic = output.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code, DiagnosticCode::UnknownConstraintKind);
    assert_eq!(diagnostic.get("element"), Some("demo:Foo"));

    let foo = output.specifications.data_elements.get("demo:Foo").unwrap();
    let types: Vec<_> = foo.fields[0].constraints.iter().map(|c| c.constraint_type()).collect();
    assert_eq!(types, vec![ConstraintType::Card]);
}

#[test]
fn test_import_is_idempotent_across_fresh_importers() {
    let first = {
        let mut importer = Importer::new();
        importer.add_all(&project_documents());
        importer.into_specifications().unwrap().specifications
    };
    let second = {
        let mut importer = Importer::new();
        importer.add_all(&project_documents());
        importer.into_specifications().unwrap().specifications
    };
    assert_eq!(first, second);
}

#[test]
fn test_duplicate_definition_fails_assembly() {
    let mut importer = Importer::new();
    let mut docs = project_documents();
    docs.push(json!({"fileType": "ValueSet", "namespace": "demo", "name": "StatusVS"}));
    importer.add_all(&docs);

    let err = importer.into_specifications().unwrap_err();
    assert!(matches!(
        err,
        ImportError::Model(ModelError::DuplicateDefinition { kind: "value set", .. })
    ));
}

#[test]
fn test_card_history_reconstruction() {
    let mut importer = Importer::new();
    importer
        .add(&json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Child",
            "fields": [{
                "valueType": "IdentifiableValue",
                "fqn": "demo.Bar",
                "card": {
                    "min": 1,
                    "max": 1,
                    "history": [
                        {"min": 0, "max": null, "source": "demo.Grandparent"},
                        {"min": 0, "max": 1, "source": "demo.Parent"},
                        {"min": 1, "max": 1, "source": "demo.Child"}
                    ]
                }
            }]
        }))
        .unwrap();

    let specs = importer.into_specifications().unwrap().specifications;
    let field = &specs.data_elements.get("demo:Child").unwrap().fields[0];

    let card = field.card.as_ref().unwrap();
    assert_eq!(card.to_string(), "0..*");
    let sources: Vec<_> = card.history().iter().map(|h| h.source.fqn()).collect();
    assert_eq!(sources, vec!["demo:Grandparent", "demo:Parent", "demo:Child"]);

    let synthetic = field.constraints_filter().own().card();
    assert_eq!(synthetic.len(), 1);
    let constraint = synthetic.first().unwrap();
    assert_eq!(constraint.kind, ConstraintKind::Card(Cardinality::exactly_one()));
    assert_eq!(constraint.last_modified_by, Some(Identifier::new("demo", "Child")));
}

#[test]
fn test_fatal_errors_do_not_stop_the_run() {
    let mut importer = Importer::new();
    let errors = importer.add_all(&[
        json!({"fileType": "DataElement", "namespace": "demo"}),
        json!({"fileType": "Mapping", "namespace": "demo", "name": "Foo"}),
        json!({"fileType": "ProjectInfo"}),
        json!({"fileType": "DataElement", "namespace": "demo", "name": "Ok"}),
    ]);

    let fields: Vec<_> = errors
        .iter()
        .map(|e| match e {
            ImportError::MissingField { field, .. } => *field,
            other => panic!("unexpected error {other}"),
        })
        .collect();
    assert_eq!(fields, vec!["name", "targetSpec", "projectURL"]);

    let output = importer.into_specifications().unwrap();
    assert_eq!(output.specifications.data_elements.len(), 1);
    assert!(output.project_info.is_none());
}
