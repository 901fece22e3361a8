//! Error types for the export crate.

use std::path::PathBuf;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while persisting export configuration or trees.
///
/// Building a tree never fails; unknown coding systems and similar anomalies
/// are reported through the diagnostics handle instead.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error while reading or writing a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl ExportError {
    /// Creates an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
