//! The value algebra: what a field or element holds.

use std::fmt;

use crate::cardinality::Cardinality;
use crate::constraint::{Constraint, ConstraintHistory, ConstraintKind, ConstraintsFilter};
use crate::identifier::Identifier;

/// Whether a value was inherited unchanged or overridden by a descendant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InheritanceStatus {
    /// Taken from an ancestor as-is.
    Inherited,
    /// Taken from an ancestor and then narrowed.
    Overridden,
}

impl InheritanceStatus {
    /// Returns the canonical lower-case spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            InheritanceStatus::Inherited => "inherited",
            InheritanceStatus::Overridden => "overridden",
        }
    }

    /// Parses `inherited` / `overridden`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "inherited" => Some(InheritanceStatus::Inherited),
            "overridden" => Some(InheritanceStatus::Overridden),
            _ => None,
        }
    }
}

impl fmt::Display for InheritanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks where an inherited value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inheritance {
    /// Inherited or overridden.
    pub status: InheritanceStatus,
    /// The ancestor the value came from.
    pub from: Identifier,
}

/// The shape of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// Contains an instance of the identified element.
    Identifiable(Identifier),
    /// Refers to, rather than contains, the identified element.
    Reference(Identifier),
    /// One of several typed alternatives.
    Choice(Vec<Value>),
    /// Placeholder text for a definition deferred to later.
    Unresolved(String),
    /// The identifier is known but its definition is not yet available.
    Incomplete(Identifier),
}

/// Discriminant of [`ValueKind`], named by canonical document tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// `IdentifiableValue`
    Identifiable,
    /// `RefValue`
    Reference,
    /// `ChoiceValue`
    Choice,
    /// `TBD`
    Unresolved,
    /// `IncompleteValue`
    Incomplete,
}

impl ValueType {
    /// Every value type, in declaration order.
    pub const ALL: [ValueType; 5] = [
        ValueType::Identifiable,
        ValueType::Reference,
        ValueType::Choice,
        ValueType::Unresolved,
        ValueType::Incomplete,
    ];

    /// The tag used in canonical documents and exported trees.
    pub fn tag(&self) -> &'static str {
        match self {
            ValueType::Identifiable => "IdentifiableValue",
            ValueType::Reference => "RefValue",
            ValueType::Choice => "ChoiceValue",
            ValueType::Unresolved => "TBD",
            ValueType::Incomplete => "IncompleteValue",
        }
    }

    /// Looks up a value type by tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A typed value with its cardinality, constraints and provenance.
///
/// # Examples
///
/// ```rust
/// use shr_models::{Cardinality, Identifier, Value, ValueType};
///
/// let value = Value::identifiable(Identifier::new("demo", "Bar"))
///     .with_card(Cardinality::zero_or_one());
/// assert_eq!(value.value_type(), ValueType::Identifiable);
/// assert_eq!(value.identifier().unwrap().fqn(), "demo:Bar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value {
    /// The case this value holds.
    pub kind: ValueKind,
    /// Declared cardinality.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub card: Option<Cardinality>,
    /// Constraints in declaration order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub constraints: Vec<Constraint>,
    /// Inheritance marker.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub inheritance: Option<Inheritance>,
    /// How constraints evolved along the inheritance chain.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub constraint_history: Option<ConstraintHistory>,
}

impl Value {
    /// Creates a value of the given kind with no card or constraints.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            card: None,
            constraints: Vec::new(),
            inheritance: None,
            constraint_history: None,
        }
    }

    /// `Identifiable` shorthand.
    pub fn identifiable(identifier: Identifier) -> Self {
        Self::new(ValueKind::Identifiable(identifier))
    }

    /// `Reference` shorthand.
    pub fn reference(identifier: Identifier) -> Self {
        Self::new(ValueKind::Reference(identifier))
    }

    /// `Choice` shorthand.
    pub fn choice(options: Vec<Value>) -> Self {
        Self::new(ValueKind::Choice(options))
    }

    /// `Unresolved` shorthand.
    pub fn unresolved(text: impl Into<String>) -> Self {
        Self::new(ValueKind::Unresolved(text.into()))
    }

    /// `Incomplete` shorthand.
    pub fn incomplete(identifier: Identifier) -> Self {
        Self::new(ValueKind::Incomplete(identifier))
    }

    /// Sets the cardinality.
    pub fn with_card(mut self, card: Cardinality) -> Self {
        self.card = Some(card);
        self
    }

    /// Appends a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Sets the inheritance marker.
    pub fn with_inheritance(mut self, inheritance: Inheritance) -> Self {
        self.inheritance = Some(inheritance);
        self
    }

    /// Returns the discriminant.
    pub fn value_type(&self) -> ValueType {
        match self.kind {
            ValueKind::Identifiable(_) => ValueType::Identifiable,
            ValueKind::Reference(_) => ValueType::Reference,
            ValueKind::Choice(_) => ValueType::Choice,
            ValueKind::Unresolved(_) => ValueType::Unresolved,
            ValueKind::Incomplete(_) => ValueType::Incomplete,
        }
    }

    /// The identifier, for the cases that carry one.
    pub fn identifier(&self) -> Option<&Identifier> {
        match &self.kind {
            ValueKind::Identifiable(id) | ValueKind::Reference(id) | ValueKind::Incomplete(id) => {
                Some(id)
            }
            ValueKind::Choice(_) | ValueKind::Unresolved(_) => None,
        }
    }

    /// Choice options; empty for every other case.
    pub fn options(&self) -> &[Value] {
        match &self.kind {
            ValueKind::Choice(options) => options,
            _ => &[],
        }
    }

    /// A filter over this value's constraints.
    pub fn constraints_filter(&self) -> ConstraintsFilter<'_> {
        ConstraintsFilter::new(&self.constraints)
    }

    /// The cardinality after applying the last own `Card` constraint.
    ///
    /// Falls back to the declared card when no own `Card` constraint exists.
    pub fn effective_card(&self) -> Option<&Cardinality> {
        let narrowed = self
            .constraints_filter()
            .own()
            .card()
            .last()
            .and_then(|c| match &c.kind {
                ConstraintKind::Card(card) => Some(card),
                _ => None,
            });
        narrowed.or(self.card.as_ref())
    }

    /// Returns true if the value was inherited or overridden.
    pub fn is_inherited(&self) -> bool {
        self.inheritance.is_some()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Identifiable(id) => write!(f, "{}", id)?,
            ValueKind::Reference(id) => write!(f, "ref({})", id)?,
            ValueKind::Incomplete(id) => write!(f, "{}?", id)?,
            ValueKind::Unresolved(text) => write!(f, "TBD({})", text)?,
            ValueKind::Choice(options) => {
                write!(f, "(")?;
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{}", option)?;
                }
                write!(f, ")")?;
            }
        }
        if let Some(card) = &self.card {
            write!(f, " {}", card)?;
        }
        Ok(())
    }
}
