//! Mappings from data elements onto an external target specification.

use std::fmt;

use crate::cardinality::Cardinality;
use crate::identifier::{render_path, Identifier};
use crate::value::Inheritance;

/// The mapping statement a rule makes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingRuleKind {
    /// Maps a source field path onto a target path.
    Field {
        /// Fields descended through in the source element.
        source_path: Vec<Identifier>,
        /// Target path.
        target: String,
    },
    /// Narrows the cardinality of a target path.
    Cardinality {
        /// Target path.
        target: String,
        /// Cardinality applied.
        cardinality: Cardinality,
    },
    /// Fixes a target path to a literal value.
    FixedValue {
        /// Target path.
        target: String,
        /// Literal value.
        value: String,
    },
}

/// One mapping rule with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappingRule {
    /// What the rule maps.
    pub kind: MappingRuleKind,
    /// Element that last set this rule.
    pub last_modified_by: Option<Identifier>,
}

impl MappingRule {
    /// Creates a rule without provenance.
    pub fn new(kind: MappingRuleKind) -> Self {
        Self {
            kind,
            last_modified_by: None,
        }
    }

    /// The target path the rule addresses.
    pub fn target(&self) -> &str {
        match &self.kind {
            MappingRuleKind::Field { target, .. }
            | MappingRuleKind::Cardinality { target, .. }
            | MappingRuleKind::FixedValue { target, .. } => target,
        }
    }
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MappingRuleKind::Field {
                source_path,
                target,
            } => write!(f, "{} maps to {}", render_path(source_path), target),
            MappingRuleKind::Cardinality {
                target,
                cardinality,
            } => write!(f, "{} {}", target, cardinality),
            MappingRuleKind::FixedValue { target, value } => {
                write!(f, "fix {} to {}", target, value)
            }
        }
    }
}

/// Maps one source element onto an item of a target specification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementMapping {
    /// The mapped element.
    pub source: Identifier,
    /// Target specification name.
    pub target_spec: String,
    /// Target item within the specification.
    pub target_item: Option<String>,
    /// Whether the mapping was inherited from an ancestor's mapping.
    pub inheritance: Option<Inheritance>,
    /// Rules in declaration order.
    pub rules: Vec<MappingRule>,
}

impl ElementMapping {
    /// Creates an empty mapping.
    pub fn new(source: Identifier, target_spec: impl Into<String>) -> Self {
        Self {
            source,
            target_spec: target_spec.into(),
            target_item: None,
            inheritance: None,
            rules: Vec::new(),
        }
    }

    /// Registry key: `{target_spec}/{source FQN}`.
    pub fn key(&self) -> String {
        mapping_key(&self.target_spec, &self.source)
    }
}

/// Builds the registry key for a mapping of `source` onto `target_spec`.
pub fn mapping_key(target_spec: &str, source: &Identifier) -> String {
    format!("{}/{}", target_spec, source.fqn())
}
