//! # shr-models
//!
//! Typed in-memory model of clinical data definitions: data elements, value
//! sets, code systems and mappings onto external specifications.
//!
//! This crate provides:
//! - **Identifiers and cardinality**: FQN-addressed identifiers, primitive
//!   type names and `min..max` cardinalities with provenance history
//! - **Value algebra**: identifiable, reference, choice, unresolved (TBD) and
//!   incomplete values, each carrying cardinality and constraints
//! - **Constraint model**: path-addressed constraints with per-kind history
//! - **Specifications**: ordered, FQN-indexed entity collections
//! - **Diagnostics**: the scoped [`Logger`] handle used by import and export
//!
//! ## Usage
//!
//! ```rust
//! use shr_models::{Cardinality, DataElement, Identifier, Specifications, Value};
//!
//! let mut foo = DataElement::new(Identifier::new("demo", "Foo"), "5.0");
//! foo.value = Some(
//!     Value::identifiable(Identifier::new("demo", "Bar")).with_card(Cardinality::zero_or_one()),
//! );
//!
//! let mut specs = Specifications::new();
//! specs.data_elements.add(foo).unwrap();
//! assert!(specs.data_elements.get("demo:Foo").is_some());
//! ```
//!
//! ## Value types
//!
//! | Tag | Variant | Carries |
//! |-----|---------|---------|
//! | `IdentifiableValue` | [`ValueKind::Identifiable`] | identifier |
//! | `RefValue` | [`ValueKind::Reference`] | identifier |
//! | `ChoiceValue` | [`ValueKind::Choice`] | options |
//! | `TBD` | [`ValueKind::Unresolved`] | text |
//! | `IncompleteValue` | [`ValueKind::Incomplete`] | identifier |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cardinality;
mod concept;
mod constraint;
pub mod diagnostics;
mod element;
mod error;
mod identifier;
mod mapping;
mod namespace;
mod specifications;
mod value;
mod vocabulary;

pub use cardinality::{Cardinality, CardinalityHistoryEntry};
pub use concept::Concept;
pub use constraint::{
    BindingStrength, Constraint, ConstraintHistory, ConstraintHistoryEntry, ConstraintKind,
    ConstraintType, ConstraintsFilter,
};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Logger, Severity};
pub use element::DataElement;
pub use error::{ModelError, ModelResult};
pub use identifier::{render_path, Identifier, Primitive, PRIMITIVE_NS};
pub use mapping::{mapping_key, ElementMapping, MappingRule, MappingRuleKind};
pub use namespace::{Namespace, ProjectInfo};
pub use specifications::{Entity, EntityCollection, Specifications};
pub use value::{Inheritance, InheritanceStatus, Value, ValueKind, ValueType};
pub use vocabulary::{CodeSystem, ValueSet, ValueSetRule};
