//! Data element definitions.

use crate::concept::Concept;
use crate::identifier::Identifier;
use crate::value::Value;

/// A data element: an identified, optionally valued, structure of fields.
///
/// `based_on` lists direct parents; `hierarchy` is the full ancestor chain as
/// computed upstream and is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataElement {
    /// Element identifier.
    pub identifier: Identifier,
    /// Whether the element is independently instantiable.
    pub is_entry: bool,
    /// Whether the element is abstract.
    pub is_abstract: bool,
    /// Optional description.
    pub description: Option<String>,
    /// Concepts describing the element.
    pub concepts: Vec<Concept>,
    /// Direct parents.
    pub based_on: Vec<Identifier>,
    /// Full ancestor chain.
    pub hierarchy: Vec<Identifier>,
    /// The element's own value.
    pub value: Option<Value>,
    /// Fields in declaration order.
    pub fields: Vec<Value>,
    /// Grammar version the definition was written in.
    pub grammar_version: String,
}

impl DataElement {
    /// Creates an empty, non-entry, non-abstract element.
    pub fn new(identifier: Identifier, grammar_version: impl Into<String>) -> Self {
        Self {
            identifier,
            is_entry: false,
            is_abstract: false,
            description: None,
            concepts: Vec::new(),
            based_on: Vec::new(),
            hierarchy: Vec::new(),
            value: None,
            fields: Vec::new(),
            grammar_version: grammar_version.into(),
        }
    }

    /// Finds a field by identifier.
    pub fn field(&self, identifier: &Identifier) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.identifier() == Some(identifier))
    }

    /// Returns true if `ancestor` appears in the hierarchy.
    pub fn descends_from(&self, ancestor: &Identifier) -> bool {
        self.hierarchy.contains(ancestor) || self.based_on.contains(ancestor)
    }
}
