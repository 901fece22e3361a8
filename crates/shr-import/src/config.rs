//! Configuration types for the importer.

/// Grammar version recorded on data elements that do not declare one.
pub const DEFAULT_GRAMMAR_VERSION: &str = "5.0";

/// Configuration for the importer.
///
/// # Example
///
/// ```rust
/// use shr_import::ImportConfig;
///
/// let config = ImportConfig::builder()
///     .with_default_grammar_version("6.0")
///     .with_strict_file_types(true)
///     .build();
/// assert_eq!(config.default_grammar_version, "6.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Applied when a data element omits `grammarVersion`.
    pub default_grammar_version: String,
    /// Reject documents with an unknown `fileType` instead of reporting them.
    pub strict_file_types: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_grammar_version: DEFAULT_GRAMMAR_VERSION.to_string(),
            strict_file_types: false,
        }
    }
}

impl ImportConfig {
    /// Creates a new builder for ImportConfig.
    pub fn builder() -> ImportConfigBuilder {
        ImportConfigBuilder::default()
    }
}

/// Builder for ImportConfig.
#[derive(Debug, Clone, Default)]
pub struct ImportConfigBuilder {
    default_grammar_version: Option<String>,
    strict_file_types: bool,
}

impl ImportConfigBuilder {
    /// Sets the fallback grammar version.
    pub fn with_default_grammar_version(mut self, version: impl Into<String>) -> Self {
        self.default_grammar_version = Some(version.into());
        self
    }

    /// Enables or disables strict `fileType` checking.
    pub fn with_strict_file_types(mut self, strict: bool) -> Self {
        self.strict_file_types = strict;
        self
    }

    /// Builds the ImportConfig.
    pub fn build(self) -> ImportConfig {
        ImportConfig {
            default_grammar_version: self
                .default_grammar_version
                .unwrap_or_else(|| DEFAULT_GRAMMAR_VERSION.to_string()),
            strict_file_types: self.strict_file_types,
        }
    }
}
