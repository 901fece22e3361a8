//! # shr-export
//!
//! Projects a [`shr_models::Specifications`] registry into a labeled,
//! deterministic document tree suitable for browsing or rendering.
//!
//! ## Tree shape
//!
//! | Level | Node type | Label |
//! |-------|-----------|-------|
//! | root | `Root` | project shorthand |
//! | groups | `Namespaces`, `ValueSets`, `CodeSystems` | group name |
//! | namespace | `Namespace` | namespace name |
//! | element | `DataElement` / `EntryElement` | element name |
//! | value | `IdentifiableValue`, `RefValue`, `ChoiceValue`, `TBD`, `IncompleteValue` | FQN, `Choice`, or TBD text |
//! | constraint | `CardConstraint`, `ValueSetConstraint`, ... | card, URL, concept, type |
//!
//! Codes and coding systems get browsable URLs from [`derive_url`].
//!
//! ## Quick Start
//!
//! ```rust
//! use shr_export::{export_to_hierarchy, ExportConfig};
//! use shr_models::{DataElement, Diagnostics, Identifier, Logger, Specifications};
//!
//! let mut specs = Specifications::new();
//! specs.data_elements.add(DataElement::new(Identifier::new("demo", "Bar"), "5.0")).unwrap();
//!
//! let config = ExportConfig::builder()
//!     .with_project_shorthand("DEMO")
//!     .with_project_url("http://example.org/shr")
//!     .build();
//! let mut diagnostics = Diagnostics::new();
//! let root = export_to_hierarchy(&specs, &config, &mut Logger::new(&mut diagnostics));
//!
//! assert_eq!(root.label, "DEMO");
//! let json = root.to_json_string().unwrap();
//! assert!(json.contains("\"type\": \"DataElement\""));
//! ```
//!
//! ## Features
//!
//! - **`parallel`**: export namespaces concurrently with rayon when
//!   [`ExportConfig::parallel`] is set. Output and diagnostics order are the
//!   same as a sequential export.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;
mod hierarchy;
mod tree;
pub mod url;

// Public re-exports
pub use config::{ExportConfig, ExportConfigBuilder, DEFAULT_PROJECT_SHORTHAND};
pub use error::{ExportError, ExportResult};
pub use hierarchy::{export_to_hierarchy, CHOICE_LABEL};
pub use tree::{Bound, DocumentNode, NodeType};
pub use url::{derive_url, KNOWN_BASES};
