//! # shr-import
//!
//! Builds the [`shr_models`] registry from canonical JSON definition
//! documents.
//!
//! Each document carries a `fileType` naming the entity it defines. The
//! [`Importer`] routes documents to the matching constructor, reconstructs
//! values, cardinality histories and path-addressed constraints, and finally
//! assembles a [`Specifications`] registry.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use shr_import::Importer;
//!
//! let mut importer = Importer::new();
//! importer.add(&json!({
//!     "fileType": "DataElement",
//!     "namespace": "demo",
//!     "name": "Foo",
//!     "value": {"valueType": "IdentifiableValue", "fqn": "demo.Bar", "card": {"min": 0, "max": 1}}
//! })).unwrap();
//!
//! let output = importer.into_specifications().unwrap();
//! let foo = output.specifications.data_elements.get("demo:Foo").unwrap();
//! assert_eq!(foo.value.as_ref().unwrap().card.as_ref().unwrap().to_string(), "0..1");
//! ```
//!
//! ## Failure policy
//!
//! | Problem | Outcome |
//! |---------|---------|
//! | Missing `fileType`, `namespace`/`name`, `targetSpec`, `projectURL` | [`ImportError::MissingField`], document rejected |
//! | Unknown `fileType` | diagnostic (or [`ImportError::InvalidField`] when strict) |
//! | Unknown value type, constraint key, rule | diagnostic, part omitted |
//! | Malformed card, concept, rule | diagnostic, part omitted |
//! | Duplicate registry key | [`ImportError::Model`] at assembly |
//!
//! ## Document key order
//!
//! Constraint order, subpath order and history kind order follow document key
//! order, so this crate enables serde_json's `preserve_order` feature.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod constraints;
mod document;
mod element;
mod error;
mod importer;
mod mapping;
mod namespace;
mod result;
mod values;
mod valueset;

// Public re-exports
pub use config::{ImportConfig, ImportConfigBuilder, DEFAULT_GRAMMAR_VERSION};
pub use constraints::{import_constraint_record, import_constraints, SUBPATHS_KEY};
pub use element::DataElementImporter;
pub use error::{ImportError, ImportResult};
pub use importer::{FileType, Importer};
pub use mapping::MappingImporter;
pub use namespace::NamespaceImporter;
pub use result::{ImportOutput, ImportStats};
pub use values::{import_value, tbd_text};
pub use valueset::ValueSetImporter;

// Re-export commonly used types from dependencies for convenience
pub use shr_models::{Diagnostics, Logger, Specifications};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _: Option<ImportConfig> = None;
        let _: Option<ImportOutput> = None;
        let _: Option<ImportStats> = None;
        let _: Option<ImportResult<()>> = None;
        let _: Option<DataElementImporter> = None;
        let _: Option<FileType> = None;
    }
}
