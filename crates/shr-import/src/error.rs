//! Error types for document import.

use shr_models::ModelError;
use thiserror::Error;

/// Fatal errors for a single document or for registry assembly.
///
/// Recoverable anomalies are reported as diagnostics instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// A required identifying field is absent.
    #[error("missing required field '{field}' in {context}")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
        /// Which document was being read.
        context: String,
    },

    /// A required field is present but unusable.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Error from the model layer (e.g. a duplicate definition).
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type for import operations.
pub type ImportResult<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_field() {
        let err = ImportError::MissingField {
            field: "targetSpec",
            context: "Mapping demo:Foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing required field 'targetSpec' in Mapping demo:Foo"
        );
    }

    #[test]
    fn test_error_display_invalid_field() {
        let err = ImportError::InvalidField {
            field: "fileType",
            reason: "unknown file type 'Widget'".to_string(),
        };
        assert_eq!(err.to_string(), "invalid field 'fileType': unknown file type 'Widget'");
    }

    #[test]
    fn test_error_from_model_error() {
        let model_err = ModelError::DuplicateDefinition {
            kind: "data element",
            key: "demo:Foo".to_string(),
        };
        let err: ImportError = model_err.into();
        assert!(matches!(err, ImportError::Model(_)));
        assert_eq!(
            err.to_string(),
            "model error: duplicate data element definition: demo:Foo"
        );
    }
}
