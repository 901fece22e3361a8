//! End-to-end tests: canonical documents in, document tree out.

use serde_json::{json, Value as Json};
use shr_export::{export_to_hierarchy, Bound, DocumentNode, ExportConfig, NodeType};
use shr_import::Importer;
use shr_models::{DiagnosticCode, Diagnostics, Logger, Severity, Specifications};

fn import(docs: &[Json]) -> (Specifications, ExportConfig) {
    let mut importer = Importer::new();
    let errors = importer.add_all(docs);
    assert!(errors.is_empty(), "unexpected import errors: {errors:?}");

    let output = importer.into_specifications().unwrap();
    let config = output
        .project_info
        .as_ref()
        .map(ExportConfig::from_project_info)
        .unwrap_or_default();
    (output.specifications, config)
}

fn export(specs: &Specifications, config: &ExportConfig) -> (DocumentNode, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let root = export_to_hierarchy(specs, config, &mut Logger::new(&mut diagnostics));
    (root, diagnostics)
}

fn namespace<'a>(root: &'a DocumentNode, name: &str) -> &'a DocumentNode {
    root.child("Namespaces").unwrap().child(name).unwrap()
}

fn element_with_field(field: Json) -> Json {
    json!({
        "fileType": "DataElement",
        "namespace": "demo",
        "name": "Holder",
        "fields": [field]
    })
}

#[test]
fn test_two_element_round_trip() {
    let (specs, config) = import(&[
        json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Foo",
            "value": {"valueType": "IdentifiableValue", "fqn": "demo.Bar", "card": {"min": 0, "max": 1}}
        }),
        json!({"fileType": "DataElement", "namespace": "demo", "name": "Bar"}),
    ]);
    assert_eq!(specs.data_elements.len(), 2);

    let (root, diagnostics) = export(&specs, &config);
    assert!(diagnostics.is_empty());

    let demo = namespace(&root, "demo");
    assert_eq!(demo.child_labels(), vec!["Bar", "Foo"]);

    let value = &demo.child("Foo").unwrap().children()[0];
    assert_eq!(value.node_type, NodeType::IdentifiableValue);
    assert_eq!(value.label, "demo:Bar");
    assert_eq!(value.min, Some(0));
    assert_eq!(value.max, Some(Bound::Bounded(1)));
    assert!(value.is_leaf());
}

#[test]
fn test_value_cases_survive_export() {
    let fields = [
        (json!({"valueType": "IdentifiableValue", "fqn": "demo.Bar"}), NodeType::IdentifiableValue, "demo:Bar"),
        (json!({"valueType": "RefValue", "fqn": "demo.Bar"}), NodeType::RefValue, "demo:Bar"),
        (json!({"valueType": "TBD", "fqn": "TBD(Reason for visit)"}), NodeType::Tbd, "Reason for visit"),
        (json!({"valueType": "IncompleteValue", "fqn": "demo.Bar"}), NodeType::IncompleteValue, "demo:Bar"),
    ];

    for (field, node_type, label) in fields {
        let (specs, config) = import(&[element_with_field(field)]);
        let (root, _) = export(&specs, &config);
        let node = &namespace(&root, "demo").child("Holder").unwrap().children()[0];
        assert_eq!(node.node_type, node_type);
        assert_eq!(node.label, label);
    }

    // Choice is only allowed as an element's own value.
    let (specs, config) = import(&[json!({
        "fileType": "DataElement",
        "namespace": "demo",
        "name": "Holder",
        "value": {
            "valueType": "ChoiceValue",
            "options": [
                {"valueType": "IdentifiableValue", "fqn": "demo.A"},
                {"valueType": "IdentifiableValue", "fqn": "primitive.string"}
            ]
        }
    })]);
    let (root, _) = export(&specs, &config);
    let choice = &namespace(&root, "demo").child("Holder").unwrap().children()[0];
    assert_eq!(choice.node_type, NodeType::ChoiceValue);
    assert_eq!(choice.label, "Choice");
    assert_eq!(choice.child_labels(), vec!["demo:A", "primitive:string"]);
}

#[test]
fn test_value_set_constraint_on_known_system() {
    let (specs, config) = import(&[element_with_field(json!({
        "valueType": "IdentifiableValue",
        "fqn": "demo.Coded",
        "constraints": {
            "valueSet": {"uri": "http://snomed.info/sct", "bindingStrength": "PREFERRED"}
        }
    }))]);

    let (root, diagnostics) = export(&specs, &config);
    assert!(diagnostics.is_empty());

    let field = &namespace(&root, "demo").child("Holder").unwrap().children()[0];
    let constraint = &field.children()[0];
    assert_eq!(constraint.node_type, NodeType::ValueSetConstraint);
    assert_eq!(constraint.label, "http://snomed.info/sct");
    assert_eq!(constraint.url.as_deref(), Some("https://browser.ihtsdotools.org/"));
    assert_eq!(constraint.binding_strength.as_deref(), Some("PREFERRED"));
}

#[test]
fn test_unknown_system_warns_once_and_falls_back() {
    let (specs, config) = import(&[
        json!({"fileType": "ProjectInfo", "projectURL": "http://example.org/shr", "projectShorthand": "DEMO"}),
        element_with_field(json!({
            "valueType": "IdentifiableValue",
            "fqn": "demo.Coded",
            "constraints": {
                "code": {"system": "http://unknown.example.com/cs", "code": "abc"},
                "subpaths": {
                    "demo.Status": {"code": {"system": "http://example.org/shr/cs/demo/Status", "code": "final"}}
                }
            }
        })),
    ]);
    assert_eq!(config.project_shorthand, "DEMO");

    let (root, diagnostics) = export(&specs, &config);
    assert_eq!(root.label, "DEMO");

    assert_eq!(diagnostics.len(), 1);
    let warning = diagnostics.iter().next().unwrap();
    assert_eq!(warning.code, DiagnosticCode::UnknownCodeSystem);
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.get("element"), Some("demo:Holder"));

    let field = &namespace(&root, "demo").child("Holder").unwrap().children()[0];
    let urls: Vec<_> = field.children().iter().map(|c| c.url.as_deref()).collect();
    assert_eq!(
        urls,
        vec![
            Some("http://unknown.example.com/cs/abc"),
            Some("http://example.org/shr/cs/demo/Status")
        ]
    );
    assert_eq!(field.children()[1].path.as_deref(), Some("demo:Status"));
}

#[test]
fn test_json_shape() {
    let (specs, config) = import(&[
        json!({"fileType": "ProjectInfo", "projectURL": "http://example.org/shr", "projectShorthand": "DEMO"}),
        json!({"fileType": "Namespace", "namespace": "demo", "description": "Demo"}),
        json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Foo",
            "isEntry": true,
            "value": {"valueType": "RefValue", "fqn": "demo.Bar", "card": {"min": 1, "max": "*"}}
        }),
    ]);
    let (root, _) = export(&specs, &config);

    let tree = serde_json::to_value(&root).unwrap();
    assert_eq!(
        tree,
        json!({
            "label": "DEMO",
            "type": "Root",
            "children": [
                {
                    "label": "Namespaces",
                    "type": "Namespaces",
                    "children": [{
                        "label": "demo",
                        "type": "Namespace",
                        "description": "Demo",
                        "children": [{
                            "label": "Foo",
                            "type": "EntryElement",
                            "fqn": "demo:Foo",
                            "abstract": false,
                            "children": [
                                {"label": "demo:Bar", "type": "RefValue", "min": 1, "max": "*"}
                            ]
                        }]
                    }]
                },
                {"label": "ValueSets", "type": "ValueSets"},
                {"label": "CodeSystems", "type": "CodeSystems"}
            ]
        })
    );
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    let mut docs = Vec::new();
    for ns in ["alpha", "beta", "gamma", "delta"] {
        for name in ["Z", "M", "A"] {
            docs.push(json!({
                "fileType": "DataElement",
                "namespace": ns,
                "name": name,
                "fields": [{
                    "valueType": "IdentifiableValue",
                    "fqn": "demo.Coded",
                    "constraints": {"code": {"system": "urn:example:cs", "code": name}}
                }]
            }));
        }
    }
    let (specs, config) = import(&docs);

    let (sequential, sequential_diagnostics) = export(&specs, &config);
    let parallel_config = ExportConfig {
        parallel: true,
        ..config
    };
    let (parallel, parallel_diagnostics) = export(&specs, &parallel_config);

    assert_eq!(sequential, parallel);
    assert_eq!(sequential_diagnostics, parallel_diagnostics);
    assert_eq!(parallel_diagnostics.len(), 12);
}

#[test]
fn test_registry_snapshot_exports_identically() {
    let (specs, config) = import(&[
        json!({"fileType": "Namespace", "namespace": "demo"}),
        json!({
            "fileType": "DataElement",
            "namespace": "demo",
            "name": "Foo",
            "value": {"valueType": "IdentifiableValue", "fqn": "demo.Bar", "card": {"min": 0, "max": 1}}
        }),
        json!({"fileType": "DataElement", "namespace": "demo", "name": "Bar"}),
    ]);

    let snapshot = serde_json::to_string(&specs).unwrap();
    let restored: Specifications = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(restored, specs);
    assert_eq!(export(&restored, &config).0, export(&specs, &config).0);

    let tampered = snapshot.replace(r#""min":0,"max":1"#, r#""min":3,"max":1"#);
    assert_ne!(tampered, snapshot);
    assert!(serde_json::from_str::<Specifications>(&tampered).is_err());
}
