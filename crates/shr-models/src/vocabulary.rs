//! Value sets and code systems.

use std::fmt;

use crate::concept::Concept;
use crate::identifier::Identifier;

/// A rule contributing codes to a value set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueSetRule {
    /// Includes a single code.
    IncludesCode(Concept),
    /// Includes every descendant of a code.
    IncludesDescendants(Concept),
    /// Excludes every descendant of a code.
    ExcludesDescendants(Concept),
    /// Includes codes reachable from a code.
    IncludesFromCode(Concept),
    /// Includes every code of a system.
    IncludesFromCodeSystem {
        /// Coding system URI.
        system: String,
    },
}

impl ValueSetRule {
    /// The tag used in canonical documents and exported trees.
    pub fn tag(&self) -> &'static str {
        match self {
            ValueSetRule::IncludesCode(_) => "IncludesCode",
            ValueSetRule::IncludesDescendants(_) => "IncludesDescendants",
            ValueSetRule::ExcludesDescendants(_) => "ExcludesDescendants",
            ValueSetRule::IncludesFromCode(_) => "IncludesFromCode",
            ValueSetRule::IncludesFromCodeSystem { .. } => "IncludesFromCodeSystem",
        }
    }

    /// The reference code, for every rule but `IncludesFromCodeSystem`.
    pub fn code(&self) -> Option<&Concept> {
        match self {
            ValueSetRule::IncludesCode(c)
            | ValueSetRule::IncludesDescendants(c)
            | ValueSetRule::ExcludesDescendants(c)
            | ValueSetRule::IncludesFromCode(c) => Some(c),
            ValueSetRule::IncludesFromCodeSystem { .. } => None,
        }
    }

    /// The coding system the rule draws from.
    pub fn system(&self) -> &str {
        match self {
            ValueSetRule::IncludesFromCodeSystem { system } => system,
            other => other.code().map(|c| c.system.as_str()).unwrap_or_default(),
        }
    }
}

impl fmt::Display for ValueSetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSetRule::IncludesCode(c) => write!(f, "includes {}", c),
            ValueSetRule::IncludesDescendants(c) => write!(f, "includes descendants of {}", c),
            ValueSetRule::ExcludesDescendants(c) => write!(f, "excludes descendants of {}", c),
            ValueSetRule::IncludesFromCode(c) => write!(f, "includes codes from {}", c),
            ValueSetRule::IncludesFromCodeSystem { system } => {
                write!(f, "includes codes from system {}", system)
            }
        }
    }
}

/// A named set of codes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueSet {
    /// Value set identifier.
    pub identifier: Identifier,
    /// Optional description.
    pub description: Option<String>,
    /// Canonical URL.
    pub url: String,
    /// Concepts describing the value set.
    pub concepts: Vec<Concept>,
    /// Membership rules in declaration order.
    pub rules: Vec<ValueSetRule>,
}

impl ValueSet {
    /// Creates an empty value set.
    pub fn new(identifier: Identifier, url: impl Into<String>) -> Self {
        Self {
            identifier,
            description: None,
            url: url.into(),
            concepts: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Codes listed by `IncludesCode` rules.
    pub fn included_codes(&self) -> impl Iterator<Item = &Concept> {
        self.rules.iter().filter_map(|r| match r {
            ValueSetRule::IncludesCode(c) => Some(c),
            _ => None,
        })
    }
}

/// A coding system defined by the project.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeSystem {
    /// Code system identifier.
    pub identifier: Identifier,
    /// Optional description.
    pub description: Option<String>,
    /// Canonical URL.
    pub url: String,
    /// Codes defined by the system.
    pub codes: Vec<Concept>,
}

impl CodeSystem {
    /// Creates an empty code system.
    pub fn new(identifier: Identifier, url: impl Into<String>) -> Self {
        Self {
            identifier,
            description: None,
            url: url.into(),
            codes: Vec::new(),
        }
    }
}
