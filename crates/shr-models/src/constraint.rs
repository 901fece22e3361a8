//! Constraints narrowing a value or one of its nested fields.

use std::fmt;

use crate::cardinality::Cardinality;
use crate::concept::Concept;
use crate::identifier::{render_path, Identifier};

// =============================================================================
// Constraint kinds
// =============================================================================

/// Strictness with which a value-set binding applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum BindingStrength {
    /// Values must come from the value set.
    #[default]
    Required,
    /// Values should come from the value set unless it lacks a suitable code.
    Extensible,
    /// Values from the value set are encouraged.
    Preferred,
    /// The value set is illustrative only.
    Example,
}

impl BindingStrength {
    /// Returns the canonical upper-case spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingStrength::Required => "REQUIRED",
            BindingStrength::Extensible => "EXTENSIBLE",
            BindingStrength::Preferred => "PREFERRED",
            BindingStrength::Example => "EXAMPLE",
        }
    }

    /// Parses a binding strength, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "REQUIRED" => Some(BindingStrength::Required),
            "EXTENSIBLE" => Some(BindingStrength::Extensible),
            "PREFERRED" => Some(BindingStrength::Preferred),
            "EXAMPLE" => Some(BindingStrength::Example),
            _ => None,
        }
    }
}

impl fmt::Display for BindingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The narrowing a constraint applies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// Narrows the cardinality.
    Card(Cardinality),

    /// Binds to a value set.
    ValueSet {
        /// Value set URL.
        url: String,
        /// Binding strength.
        binding_strength: BindingStrength,
    },

    /// Fixes the value to one code.
    FixedCode(Concept),

    /// Requires a code to be present. Repeatable on one path.
    IncludesCode(Concept),

    /// Narrows the type to a subtype.
    Type {
        /// The required type.
        is_a: Identifier,
        /// Whether the constraint applies to the value rather than the element.
        on_value: bool,
    },

    /// Requires instances of a type with a given cardinality. Repeatable on one path.
    IncludesType {
        /// The included type.
        is_a: Identifier,
        /// How many instances are included.
        cardinality: Cardinality,
    },

    /// Fixes a boolean value.
    Boolean(bool),
}

/// Discriminant of [`ConstraintKind`], named as in canonical documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintType {
    /// `card`
    Card,
    /// `valueSet`
    ValueSet,
    /// `code`
    FixedCode,
    /// `includesCode`
    IncludesCode,
    /// `type`
    Type,
    /// `includesType`
    IncludesType,
    /// `boolean`
    Boolean,
}

impl ConstraintType {
    /// Every constraint type, in declaration order.
    pub const ALL: [ConstraintType; 7] = [
        ConstraintType::Card,
        ConstraintType::ValueSet,
        ConstraintType::FixedCode,
        ConstraintType::IncludesCode,
        ConstraintType::Type,
        ConstraintType::IncludesType,
        ConstraintType::Boolean,
    ];

    /// Key used for this kind in canonical documents.
    pub fn key(&self) -> &'static str {
        match self {
            ConstraintType::Card => "card",
            ConstraintType::ValueSet => "valueSet",
            ConstraintType::FixedCode => "code",
            ConstraintType::IncludesCode => "includesCode",
            ConstraintType::Type => "type",
            ConstraintType::IncludesType => "includesType",
            ConstraintType::Boolean => "boolean",
        }
    }

    /// Looks up a constraint type by its document key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }

    /// Returns true for kinds that may appear several times on one path.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, ConstraintType::IncludesCode | ConstraintType::IncludesType)
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl ConstraintKind {
    /// Returns the discriminant.
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            ConstraintKind::Card(_) => ConstraintType::Card,
            ConstraintKind::ValueSet { .. } => ConstraintType::ValueSet,
            ConstraintKind::FixedCode(_) => ConstraintType::FixedCode,
            ConstraintKind::IncludesCode(_) => ConstraintType::IncludesCode,
            ConstraintKind::Type { .. } => ConstraintType::Type,
            ConstraintKind::IncludesType { .. } => ConstraintType::IncludesType,
            ConstraintKind::Boolean(_) => ConstraintType::Boolean,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Card(card) => write!(f, "card {}", card),
            ConstraintKind::ValueSet {
                url,
                binding_strength,
            } => write!(f, "from {} ({})", url, binding_strength),
            ConstraintKind::FixedCode(code) => write!(f, "= {}", code),
            ConstraintKind::IncludesCode(code) => write!(f, "includes {}", code),
            ConstraintKind::Type { is_a, on_value } => {
                if *on_value {
                    write!(f, "value is {}", is_a)
                } else {
                    write!(f, "is {}", is_a)
                }
            }
            ConstraintKind::IncludesType { is_a, cardinality } => {
                write!(f, "includes {} {}", cardinality, is_a)
            }
            ConstraintKind::Boolean(value) => write!(f, "= {}", value),
        }
    }
}

/// A constraint located by a structural path.
///
/// An empty path applies the constraint to the value itself; otherwise each
/// identifier names the next nested field to descend into.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    /// The narrowing applied.
    pub kind: ConstraintKind,
    /// Location of the constrained field.
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: Vec<Identifier>,
    /// Element that last set this constraint.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub last_modified_by: Option<Identifier>,
}

impl Constraint {
    /// Creates a constraint on the value itself.
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            path: Vec::new(),
            last_modified_by: None,
        }
    }

    /// Sets the path.
    pub fn at_path(mut self, path: Vec<Identifier>) -> Self {
        self.path = path;
        self
    }

    /// Sets the element that last modified this constraint.
    pub fn modified_by(mut self, source: Identifier) -> Self {
        self.last_modified_by = Some(source);
        self
    }

    /// Returns the discriminant of the kind.
    pub fn constraint_type(&self) -> ConstraintType {
        self.kind.constraint_type()
    }

    /// Returns true if the constraint applies to the value itself.
    pub fn is_own(&self) -> bool {
        self.path.is_empty()
    }

    /// Renders the path as `fqn:fqn:...` (empty for own constraints).
    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path_string())?;
        }
        write!(f, "{}", self.kind)
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Chainable, borrowed view over a constraint list.
///
/// # Examples
///
/// ```rust
/// use shr_models::{Cardinality, Constraint, ConstraintKind, ConstraintsFilter, Identifier};
///
/// let constraints = vec![
///     Constraint::new(ConstraintKind::Card(Cardinality::exactly_one())),
///     Constraint::new(ConstraintKind::Boolean(true))
///         .at_path(vec![Identifier::new("demo", "Flag")]),
/// ];
///
/// let filter = ConstraintsFilter::new(&constraints);
/// assert_eq!(filter.clone().own().card().len(), 1);
/// assert_eq!(filter.clone().child().boolean().len(), 1);
/// assert!(filter.own().boolean().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintsFilter<'a> {
    constraints: Vec<&'a Constraint>,
}

impl<'a> ConstraintsFilter<'a> {
    /// Creates a filter over all given constraints.
    pub fn new(constraints: &'a [Constraint]) -> Self {
        Self {
            constraints: constraints.iter().collect(),
        }
    }

    fn retain(self, keep: impl Fn(&Constraint) -> bool) -> Self {
        Self {
            constraints: self.constraints.into_iter().filter(|c| keep(c)).collect(),
        }
    }

    /// Keeps constraints of the given type.
    pub fn of_type(self, constraint_type: ConstraintType) -> Self {
        self.retain(|c| c.constraint_type() == constraint_type)
    }

    /// Keeps `Card` constraints.
    pub fn card(self) -> Self {
        self.of_type(ConstraintType::Card)
    }

    /// Keeps `ValueSet` constraints.
    pub fn value_set(self) -> Self {
        self.of_type(ConstraintType::ValueSet)
    }

    /// Keeps `FixedCode` constraints.
    pub fn fixed_code(self) -> Self {
        self.of_type(ConstraintType::FixedCode)
    }

    /// Keeps `IncludesCode` constraints.
    pub fn includes_code(self) -> Self {
        self.of_type(ConstraintType::IncludesCode)
    }

    /// Keeps `Type` constraints.
    pub fn type_(self) -> Self {
        self.of_type(ConstraintType::Type)
    }

    /// Keeps `IncludesType` constraints.
    pub fn includes_type(self) -> Self {
        self.of_type(ConstraintType::IncludesType)
    }

    /// Keeps `Boolean` constraints.
    pub fn boolean(self) -> Self {
        self.of_type(ConstraintType::Boolean)
    }

    /// Keeps constraints on the value itself.
    pub fn own(self) -> Self {
        self.retain(Constraint::is_own)
    }

    /// Keeps constraints on nested fields.
    pub fn child(self) -> Self {
        self.retain(|c| !c.is_own())
    }

    /// Keeps constraints whose path equals `path`.
    pub fn with_path(self, path: &[Identifier]) -> Self {
        self.retain(|c| c.path.as_slice() == path)
    }

    /// Iterates the remaining constraints in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Constraint> + '_ {
        self.constraints.iter().copied()
    }

    /// Number of remaining constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns true if nothing remains.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// First remaining constraint.
    pub fn first(&self) -> Option<&'a Constraint> {
        self.constraints.first().copied()
    }

    /// Last remaining constraint.
    pub fn last(&self) -> Option<&'a Constraint> {
        self.constraints.last().copied()
    }
}

// =============================================================================
// Provenance history
// =============================================================================

/// One step in the history of a constraint across an inheritance chain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintHistoryEntry {
    /// The constraint as it stood at `source`.
    pub constraint: Constraint,
    /// The element that declared it.
    pub source: Identifier,
    /// Whether a later element overrode it.
    pub overridden: bool,
}

/// Append-only, per-kind record of how constraints changed along the
/// inheritance chain. Kinds keep first-seen order; entries keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintHistory {
    kinds: Vec<(ConstraintType, Vec<ConstraintHistoryEntry>)>,
}

impl ConstraintHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry under its constraint's kind.
    pub fn push(&mut self, entry: ConstraintHistoryEntry) {
        let kind = entry.constraint.constraint_type();
        match self.kinds.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, entries)) => entries.push(entry),
            None => self.kinds.push((kind, vec![entry])),
        }
    }

    /// Entries recorded for one kind, oldest first.
    pub fn entries(&self, kind: ConstraintType) -> &[ConstraintHistoryEntry] {
        self.kinds
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    /// Kinds with at least one entry, in first-seen order.
    pub fn kinds(&self) -> impl Iterator<Item = ConstraintType> + '_ {
        self.kinds.iter().map(|(k, _)| *k)
    }

    /// Total number of entries across all kinds.
    pub fn len(&self) -> usize {
        self.kinds.iter().map(|(_, entries)| entries.len()).sum()
    }

    /// Returns true if no entries were recorded.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
