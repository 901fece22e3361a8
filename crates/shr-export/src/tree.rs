//! Document tree node types.
//!
//! The tree serializes to JSON with camelCase keys, `type` for the node
//! type, and absent attributes omitted. Leaves carry no `children` key.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ExportError, ExportResult};

// ============================================================================
// Node type
// ============================================================================

/// Kind of a [`DocumentNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// The project root.
    Root,
    /// Group of all namespaces.
    Namespaces,
    /// One namespace.
    Namespace,
    /// A non-entry data element.
    DataElement,
    /// An entry data element.
    EntryElement,
    /// An identifiable value.
    IdentifiableValue,
    /// A reference value.
    RefValue,
    /// A choice value.
    ChoiceValue,
    /// An unresolved placeholder value.
    #[serde(rename = "TBD")]
    Tbd,
    /// An incomplete value.
    IncompleteValue,
    /// Cardinality constraint.
    CardConstraint,
    /// Value set binding.
    ValueSetConstraint,
    /// Fixed code.
    CodeConstraint,
    /// Included code.
    IncludesCodeConstraint,
    /// Type constraint.
    TypeConstraint,
    /// Included type.
    IncludesTypeConstraint,
    /// Fixed boolean.
    BooleanConstraint,
    /// Group of all value sets.
    ValueSets,
    /// One value set.
    ValueSet,
    /// Group of all code systems.
    CodeSystems,
    /// One code system.
    CodeSystem,
    /// A concept.
    Concept,
    /// Value set rule: include a code.
    IncludesCode,
    /// Value set rule: include a code's descendants.
    IncludesDescendants,
    /// Value set rule: exclude a code's descendants.
    ExcludesDescendants,
    /// Value set rule: include codes from a code.
    IncludesFromCode,
    /// Value set rule: include a whole code system.
    IncludesFromCodeSystem,
}

impl NodeType {
    /// The serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "Root",
            NodeType::Namespaces => "Namespaces",
            NodeType::Namespace => "Namespace",
            NodeType::DataElement => "DataElement",
            NodeType::EntryElement => "EntryElement",
            NodeType::IdentifiableValue => "IdentifiableValue",
            NodeType::RefValue => "RefValue",
            NodeType::ChoiceValue => "ChoiceValue",
            NodeType::Tbd => "TBD",
            NodeType::IncompleteValue => "IncompleteValue",
            NodeType::CardConstraint => "CardConstraint",
            NodeType::ValueSetConstraint => "ValueSetConstraint",
            NodeType::CodeConstraint => "CodeConstraint",
            NodeType::IncludesCodeConstraint => "IncludesCodeConstraint",
            NodeType::TypeConstraint => "TypeConstraint",
            NodeType::IncludesTypeConstraint => "IncludesTypeConstraint",
            NodeType::BooleanConstraint => "BooleanConstraint",
            NodeType::ValueSets => "ValueSets",
            NodeType::ValueSet => "ValueSet",
            NodeType::CodeSystems => "CodeSystems",
            NodeType::CodeSystem => "CodeSystem",
            NodeType::Concept => "Concept",
            NodeType::IncludesCode => "IncludesCode",
            NodeType::IncludesDescendants => "IncludesDescendants",
            NodeType::ExcludesDescendants => "ExcludesDescendants",
            NodeType::IncludesFromCode => "IncludesFromCode",
            NodeType::IncludesFromCodeSystem => "IncludesFromCodeSystem",
        }
    }

    /// Returns true for the five value node types.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            NodeType::IdentifiableValue
                | NodeType::RefValue
                | NodeType::ChoiceValue
                | NodeType::Tbd
                | NodeType::IncompleteValue
        )
    }

    /// Returns true for the seven constraint node types.
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            NodeType::CardConstraint
                | NodeType::ValueSetConstraint
                | NodeType::CodeConstraint
                | NodeType::IncludesCodeConstraint
                | NodeType::TypeConstraint
                | NodeType::IncludesTypeConstraint
                | NodeType::BooleanConstraint
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Upper bound
// ============================================================================

/// Upper bound of a cardinality; serializes as a number or `"*"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// A finite maximum.
    Bounded(u32),
    /// No maximum.
    Unbounded,
}

impl From<Option<u32>> for Bound {
    fn from(max: Option<u32>) -> Self {
        max.map_or(Bound::Unbounded, Bound::Bounded)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Bounded(n) => write!(f, "{}", n),
            Bound::Unbounded => f.write_str("*"),
        }
    }
}

impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Bound::Bounded(n) => serializer.serialize_u32(*n),
            Bound::Unbounded => serializer.serialize_str("*"),
        }
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Bound::Bounded(n)),
            Raw::Text(s) if s == "*" => Ok(Bound::Unbounded),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid upper bound '{}'",
                s
            ))),
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// One node of an exported document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    /// Display label.
    pub label: String,

    /// Node kind.
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fully qualified name of the described entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqn: Option<String>,

    /// Browsable URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Rendered constraint path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Binding strength of a value set constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_strength: Option<String>,

    /// Lower cardinality bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Upper cardinality bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,

    /// Inheritance status of a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance: Option<String>,

    /// Whether a data element is abstract.
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,

    /// Child nodes; `None` on leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DocumentNode>>,
}

impl DocumentNode {
    /// Creates a leaf node.
    pub fn new(label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            label: label.into(),
            node_type,
            description: None,
            fqn: None,
            url: None,
            path: None,
            binding_strength: None,
            min: None,
            max: None,
            inheritance: None,
            is_abstract: None,
            children: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    /// Sets the FQN.
    pub fn with_fqn(mut self, fqn: impl Into<String>) -> Self {
        self.fqn = Some(fqn.into());
        self
    }

    /// Sets the URL. An empty URL leaves the node without one.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.url = (!url.is_empty()).then_some(url);
        self
    }

    /// Sets `min` and `max`.
    pub fn with_bounds(mut self, min: u32, max: Option<u32>) -> Self {
        self.min = Some(min);
        self.max = Some(Bound::from(max));
        self
    }

    /// Appends a child, turning a leaf into an interior node.
    pub fn push(&mut self, child: DocumentNode) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }

    /// Appends several children; an empty iterator leaves a leaf untouched.
    pub fn extend(&mut self, children: impl IntoIterator<Item = DocumentNode>) {
        for child in children {
            self.push(child);
        }
    }

    /// Children, empty for a leaf.
    pub fn children(&self) -> &[DocumentNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Returns true if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// First child with the given label.
    pub fn child(&self, label: &str) -> Option<&DocumentNode> {
        self.children().iter().find(|c| c.label == label)
    }

    /// Labels of the direct children, in order.
    pub fn child_labels(&self) -> Vec<&str> {
        self.children().iter().map(|c| c.label.as_str()).collect()
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(DocumentNode::node_count).sum::<usize>()
    }

    /// Serializes the tree to pretty-printed JSON.
    pub fn to_json_string(&self) -> ExportResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialization(e.to_string()))
    }

    /// Saves the tree to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ExportResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ExportError::io_error(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;

        writer
            .flush()
            .map_err(|e| ExportError::io_error(path, e))?;
        Ok(())
    }

    /// Loads a tree from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ExportResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ExportError::io_error(path, e))?;
        let reader = BufReader::new(file);
        let node: Self = serde_json::from_reader(reader)
            .map_err(|e| ExportError::Deserialization(e.to_string()))?;
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_leaf_omits_children_and_absent_fields() {
        let node = DocumentNode::new("demo:Bar", NodeType::IdentifiableValue).with_bounds(0, Some(1));
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"label": "demo:Bar", "type": "IdentifiableValue", "min": 0, "max": 1})
        );
    }

    #[test]
    fn test_unbounded_max_and_renamed_keys() {
        let mut node = DocumentNode::new("Foo", NodeType::EntryElement).with_fqn("demo:Foo");
        node.is_abstract = Some(false);
        node.push(DocumentNode::new("TBD text", NodeType::Tbd).with_bounds(1, None));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "label": "Foo",
                "type": "EntryElement",
                "fqn": "demo:Foo",
                "abstract": false,
                "children": [{"label": "TBD text", "type": "TBD", "min": 1, "max": "*"}]
            })
        );
    }

    #[test]
    fn test_empty_url_is_omitted() {
        let node = DocumentNode::new("demo:VS", NodeType::ValueSet).with_url("");
        assert_eq!(node.url, None);
        let value = serde_json::to_value(&node).unwrap();
        assert!(value.get("url").is_none());

        let node = DocumentNode::new("demo:VS", NodeType::ValueSet).with_url("http://example.org/vs");
        assert_eq!(node.url.as_deref(), Some("http://example.org/vs"));
    }

    #[test]
    fn test_bound_deserialize() {
        let bound: Bound = serde_json::from_value(json!("*")).unwrap();
        assert_eq!(bound, Bound::Unbounded);
        let bound: Bound = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(bound, Bound::Bounded(3));
        assert!(serde_json::from_value::<Bound>(json!("many")).is_err());
    }

    #[test]
    fn test_node_navigation() {
        let mut root = DocumentNode::new("DEMO", NodeType::Root);
        assert!(root.is_leaf());
        root.extend(Vec::new());
        assert!(root.children.is_none());

        root.push(DocumentNode::new("Namespaces", NodeType::Namespaces));
        root.push(DocumentNode::new("ValueSets", NodeType::ValueSets));
        assert_eq!(root.child_labels(), vec!["Namespaces", "ValueSets"]);
        assert_eq!(root.child("ValueSets").unwrap().node_type, NodeType::ValueSets);
        assert_eq!(root.node_count(), 3);
    }

    #[test]
    fn test_node_type_groups() {
        assert!(NodeType::Tbd.is_value());
        assert!(!NodeType::Concept.is_value());
        assert!(NodeType::BooleanConstraint.is_constraint());
        assert_eq!(NodeType::Tbd.to_string(), "TBD");
        assert_eq!(
            serde_json::to_value(NodeType::IncludesFromCodeSystem).unwrap(),
            json!("IncludesFromCodeSystem")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.json");

        let mut root = DocumentNode::new("DEMO", NodeType::Root);
        root.push(
            DocumentNode::new("1..*", NodeType::CardConstraint)
                .with_bounds(1, None)
                .with_description(Some("at least one")),
        );
        root.save(&path).unwrap();

        let loaded = DocumentNode::load(&path).unwrap();
        assert_eq!(loaded, root);
    }
}
