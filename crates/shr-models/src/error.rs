//! Error types for the model layer.

use thiserror::Error;

/// Errors raised while constructing or registering model values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A cardinality whose maximum is below its minimum.
    #[error("invalid cardinality: min {min} exceeds max {max}")]
    InvalidCardinality {
        /// Declared minimum.
        min: u32,
        /// Declared maximum.
        max: u32,
    },

    /// Text that cannot be read as a fully-qualified identifier.
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// An entity whose registry key is already taken.
    #[error("duplicate {kind} definition: {key}")]
    DuplicateDefinition {
        /// Entity kind (e.g. `data element`).
        kind: &'static str,
        /// The conflicting registry key.
        key: String,
    },
}

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
