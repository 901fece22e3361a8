//! Output types of a completed import.

use std::time::Duration;

use shr_models::{Diagnostics, ProjectInfo, Specifications};

/// Everything an import run produced.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use shr_import::Importer;
///
/// let mut importer = Importer::new();
/// importer.add(&json!({"fileType": "DataElement", "namespace": "demo", "name": "Foo"})).unwrap();
///
/// let output = importer.into_specifications().unwrap();
/// assert_eq!(output.specifications.data_elements.len(), 1);
/// assert!(output.diagnostics.is_empty());
/// assert_eq!(output.stats.documents_read, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ImportOutput {
    /// The assembled registry.
    pub specifications: Specifications,
    /// Recoverable anomalies reported while reading documents.
    pub diagnostics: Diagnostics,
    /// The last `ProjectInfo` document seen, if any.
    pub project_info: Option<ProjectInfo>,
    /// Run statistics.
    pub stats: ImportStats,
}

impl ImportOutput {
    /// Returns true if no diagnostics were reported.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Statistics from an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Documents accepted into a constructor.
    pub documents_read: usize,
    /// Documents rejected with a fatal error.
    pub documents_failed: usize,
    /// Documents with an unknown `fileType`.
    pub documents_ignored: usize,
    /// Time spent reading documents.
    pub duration: Duration,
}

impl ImportStats {
    /// Total documents offered to the importer.
    pub fn documents_seen(&self) -> usize {
        self.documents_read + self.documents_failed + self.documents_ignored
    }
}
