//! Projection of a [`Specifications`] registry into a [`DocumentNode`] tree.

use std::time::Instant;

use shr_models::{
    CodeSystem, Concept, Constraint, ConstraintKind, DataElement, Logger, Specifications, Value,
    ValueKind, ValueSet, ValueSetRule,
};

use crate::config::ExportConfig;
use crate::tree::{DocumentNode, NodeType};
use crate::url::derive_url;

/// Label of a choice value node.
pub const CHOICE_LABEL: &str = "Choice";

/// Exports the registry as a labeled document tree.
///
/// The root is labeled with the project shorthand and always has three
/// children: `Namespaces`, `ValueSets` and `CodeSystems`. Namespaces, value
/// sets and code systems appear in insertion order; data elements within a
/// namespace are sorted by name. Coding systems without a derivable URL are
/// reported as `UnknownCodeSystem` warnings and never stop the export.
///
/// # Example
///
/// ```rust
/// use shr_export::{export_to_hierarchy, ExportConfig, NodeType};
/// use shr_models::{
///     Cardinality, DataElement, Diagnostics, Identifier, Logger, Specifications, Value,
/// };
///
/// let mut specs = Specifications::new();
/// let mut foo = DataElement::new(Identifier::new("demo", "Foo"), "5.0");
/// foo.value = Some(
///     Value::identifiable(Identifier::new("demo", "Bar")).with_card(Cardinality::zero_or_one()),
/// );
/// specs.data_elements.add(foo).unwrap();
///
/// let mut diagnostics = Diagnostics::new();
/// let config = ExportConfig::builder().with_project_shorthand("DEMO").build();
/// let root = export_to_hierarchy(&specs, &config, &mut Logger::new(&mut diagnostics));
///
/// let foo = &root.children()[0].children()[0].children()[0];
/// assert_eq!(foo.label, "Foo");
/// assert_eq!(foo.children()[0].node_type, NodeType::IdentifiableValue);
/// assert_eq!(foo.children()[0].label, "demo:Bar");
/// ```
pub fn export_to_hierarchy(
    specifications: &Specifications,
    config: &ExportConfig,
    logger: &mut Logger<'_>,
) -> DocumentNode {
    let start = Instant::now();
    let namespaces = collect_namespaces(specifications);

    let mut namespaces_node = DocumentNode::new("Namespaces", NodeType::Namespaces);
    namespaces_node.extend(export_namespaces(specifications, config, &namespaces, logger));

    let mut value_sets_node = DocumentNode::new("ValueSets", NodeType::ValueSets);
    for value_set in &specifications.value_sets {
        value_sets_node.push(value_set_node(value_set, config, logger));
    }

    let mut code_systems_node = DocumentNode::new("CodeSystems", NodeType::CodeSystems);
    for code_system in &specifications.code_systems {
        code_systems_node.push(code_system_node(code_system, config, logger));
    }

    let mut root = DocumentNode::new(config.project_shorthand.as_str(), NodeType::Root);
    root.push(namespaces_node);
    root.push(value_sets_node);
    root.push(code_systems_node);

    tracing::info!(
        target: "shr",
        namespaces = namespaces.len(),
        nodes = root.node_count(),
        elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
        "export complete"
    );
    root
}

// ============================================================================
// Namespaces
// ============================================================================

/// A namespace to export: registered ones first, then any only named by elements.
#[derive(Debug, Clone, Copy)]
struct NamespaceEntry<'a> {
    name: &'a str,
    description: Option<&'a str>,
}

fn collect_namespaces(specifications: &Specifications) -> Vec<NamespaceEntry<'_>> {
    let mut entries: Vec<NamespaceEntry<'_>> = specifications
        .namespaces
        .iter()
        .map(|ns| NamespaceEntry {
            name: ns.name.as_str(),
            description: ns.description.as_deref(),
        })
        .collect();

    for name in specifications.data_elements.namespaces() {
        if !entries.iter().any(|e| e.name == name) {
            entries.push(NamespaceEntry {
                name,
                description: None,
            });
        }
    }
    entries
}

#[cfg(feature = "parallel")]
fn export_namespaces(
    specifications: &Specifications,
    config: &ExportConfig,
    namespaces: &[NamespaceEntry<'_>],
    logger: &mut Logger<'_>,
) -> Vec<DocumentNode> {
    use rayon::prelude::*;
    use shr_models::Diagnostics;

    if !config.parallel {
        return namespaces
            .iter()
            .map(|ns| namespace_node(specifications, config, ns, logger))
            .collect();
    }

    let context = logger.context().to_vec();
    let exported: Vec<(DocumentNode, Diagnostics)> = namespaces
        .par_iter()
        .map(|ns| {
            let mut local = Diagnostics::new();
            let node = namespace_node(
                specifications,
                config,
                ns,
                &mut Logger::with_context(&mut local, context.clone()),
            );
            (node, local)
        })
        .collect();

    exported
        .into_iter()
        .map(|(node, local)| {
            logger.absorb(local);
            node
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn export_namespaces(
    specifications: &Specifications,
    config: &ExportConfig,
    namespaces: &[NamespaceEntry<'_>],
    logger: &mut Logger<'_>,
) -> Vec<DocumentNode> {
    if config.parallel {
        tracing::debug!(target: "shr", "parallel export requested without the `parallel` feature");
    }
    namespaces
        .iter()
        .map(|ns| namespace_node(specifications, config, ns, logger))
        .collect()
}

fn namespace_node(
    specifications: &Specifications,
    config: &ExportConfig,
    namespace: &NamespaceEntry<'_>,
    logger: &mut Logger<'_>,
) -> DocumentNode {
    let mut logger = logger.child("namespace", namespace.name);

    // Ordinal comparison; the sort is stable so equal names keep insertion order.
    let mut elements: Vec<&DataElement> =
        specifications.data_elements.by_namespace(namespace.name).collect();
    elements.sort_by(|a, b| a.identifier.name().cmp(b.identifier.name()));

    let mut node = DocumentNode::new(namespace.name, NodeType::Namespace)
        .with_description(namespace.description);
    for element in elements {
        node.push(element_node(element, config, &mut logger));
    }
    node
}

// ============================================================================
// Data elements and values
// ============================================================================

fn element_node(element: &DataElement, config: &ExportConfig, logger: &mut Logger<'_>) -> DocumentNode {
    let fqn = element.identifier.fqn();
    let mut logger = logger.child("element", fqn.as_str());

    let node_type = if element.is_entry {
        NodeType::EntryElement
    } else {
        NodeType::DataElement
    };
    let mut node = DocumentNode::new(element.identifier.name(), node_type)
        .with_description(element.description.as_deref())
        .with_fqn(fqn);
    node.is_abstract = Some(element.is_abstract);

    if let Some(value) = &element.value {
        node.push(value_node(value, config, &mut logger));
    }
    for field in &element.fields {
        node.push(value_node(field, config, &mut logger));
    }
    node
}

/// Builds the node for one value; the five cases are told apart by type and label.
fn value_node(value: &Value, config: &ExportConfig, logger: &mut Logger<'_>) -> DocumentNode {
    let (node_type, label) = match &value.kind {
        ValueKind::Identifiable(id) => (NodeType::IdentifiableValue, id.fqn()),
        ValueKind::Reference(id) => (NodeType::RefValue, id.fqn()),
        ValueKind::Choice(_) => (NodeType::ChoiceValue, CHOICE_LABEL.to_string()),
        ValueKind::Unresolved(text) => (NodeType::Tbd, text.clone()),
        ValueKind::Incomplete(id) => (NodeType::IncompleteValue, id.fqn()),
    };

    let mut node = DocumentNode::new(label, node_type);
    if let Some(card) = &value.card {
        node = node.with_bounds(card.min(), card.max());
    }
    node.inheritance = value
        .inheritance
        .as_ref()
        .map(|inheritance| inheritance.status.as_str().to_string());

    for option in value.options() {
        node.push(value_node(option, config, logger));
    }
    for constraint in &value.constraints {
        node.push(constraint_node(constraint, config, logger));
    }
    node
}

fn constraint_node(
    constraint: &Constraint,
    config: &ExportConfig,
    logger: &mut Logger<'_>,
) -> DocumentNode {
    let mut node = match &constraint.kind {
        ConstraintKind::Card(card) => DocumentNode::new(card.to_string(), NodeType::CardConstraint)
            .with_bounds(card.min(), card.max()),
        ConstraintKind::ValueSet {
            url,
            binding_strength,
        } => {
            let mut node = DocumentNode::new(url.as_str(), NodeType::ValueSetConstraint)
                .with_url(derive_url(url, None, &config.project_url, logger));
            node.binding_strength = Some(binding_strength.as_str().to_string());
            node
        }
        ConstraintKind::FixedCode(concept) => {
            concept_node(concept, NodeType::CodeConstraint, config, logger)
        }
        ConstraintKind::IncludesCode(concept) => {
            concept_node(concept, NodeType::IncludesCodeConstraint, config, logger)
        }
        ConstraintKind::Type { is_a, .. } => {
            DocumentNode::new(is_a.fqn(), NodeType::TypeConstraint).with_fqn(is_a.fqn())
        }
        ConstraintKind::IncludesType { is_a, cardinality } => {
            DocumentNode::new(is_a.fqn(), NodeType::IncludesTypeConstraint)
                .with_fqn(is_a.fqn())
                .with_bounds(cardinality.min(), cardinality.max())
        }
        ConstraintKind::Boolean(value) => {
            DocumentNode::new(value.to_string(), NodeType::BooleanConstraint)
        }
    };

    if !constraint.is_own() {
        node.path = Some(constraint.path_string());
    }
    node
}

// ============================================================================
// Vocabulary
// ============================================================================

fn value_set_node(value_set: &ValueSet, config: &ExportConfig, logger: &mut Logger<'_>) -> DocumentNode {
    let fqn = value_set.identifier.fqn();
    let mut logger = logger.child("valueSet", fqn.as_str());

    let mut node = DocumentNode::new(fqn, NodeType::ValueSet)
        .with_description(value_set.description.as_deref())
        .with_url(value_set.url.as_str());

    for concept in &value_set.concepts {
        node.push(concept_node(concept, NodeType::Concept, config, &mut logger));
    }
    for rule in &value_set.rules {
        node.push(rule_node(rule, config, &mut logger));
    }
    node
}

fn code_system_node(
    code_system: &CodeSystem,
    config: &ExportConfig,
    logger: &mut Logger<'_>,
) -> DocumentNode {
    let fqn = code_system.identifier.fqn();
    let mut logger = logger.child("codeSystem", fqn.as_str());

    let mut node = DocumentNode::new(fqn, NodeType::CodeSystem)
        .with_description(code_system.description.as_deref())
        .with_url(code_system.url.as_str());

    for concept in &code_system.codes {
        node.push(concept_node(concept, NodeType::Concept, config, &mut logger));
    }
    node
}

fn rule_node(rule: &ValueSetRule, config: &ExportConfig, logger: &mut Logger<'_>) -> DocumentNode {
    let node_type = match rule {
        ValueSetRule::IncludesCode(_) => NodeType::IncludesCode,
        ValueSetRule::IncludesDescendants(_) => NodeType::IncludesDescendants,
        ValueSetRule::ExcludesDescendants(_) => NodeType::ExcludesDescendants,
        ValueSetRule::IncludesFromCode(_) => NodeType::IncludesFromCode,
        ValueSetRule::IncludesFromCodeSystem { .. } => NodeType::IncludesFromCodeSystem,
    };

    match rule.code() {
        Some(concept) => concept_node(concept, node_type, config, logger),
        None => {
            let system = rule.system();
            DocumentNode::new(system, node_type)
                .with_url(derive_url(system, None, &config.project_url, logger))
        }
    }
}

fn concept_node(
    concept: &Concept,
    node_type: NodeType,
    config: &ExportConfig,
    logger: &mut Logger<'_>,
) -> DocumentNode {
    DocumentNode::new(concept.label(), node_type).with_url(derive_url(
        &concept.system,
        Some(concept.code.as_str()),
        &config.project_url,
        logger,
    ))
}
