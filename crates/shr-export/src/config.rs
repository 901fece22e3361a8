//! Export configuration.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use shr_models::ProjectInfo;

use crate::error::{ExportError, ExportResult};

/// Root label used when no project shorthand is configured.
pub const DEFAULT_PROJECT_SHORTHAND: &str = "SHR";

/// Configuration for [`export_to_hierarchy`](crate::export_to_hierarchy).
///
/// Stored on disk as JSON in the same shape as a `ProjectInfo` document:
///
/// ```json
/// {"projectShorthand": "DEMO", "projectURL": "http://example.org/shr", "parallel": false}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Label of the root node.
    #[serde(default = "default_project_shorthand")]
    pub project_shorthand: String,

    /// Base URL of project-owned code systems; systems under it keep their URL.
    #[serde(rename = "projectURL", default)]
    pub project_url: String,

    /// Export namespaces concurrently (requires the `parallel` feature).
    #[serde(default)]
    pub parallel: bool,
}

fn default_project_shorthand() -> String {
    DEFAULT_PROJECT_SHORTHAND.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            project_shorthand: default_project_shorthand(),
            project_url: String::new(),
            parallel: false,
        }
    }
}

impl ExportConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Builds a configuration from an imported `ProjectInfo`.
    ///
    /// A missing shorthand falls back to [`DEFAULT_PROJECT_SHORTHAND`].
    pub fn from_project_info(info: &ProjectInfo) -> Self {
        Self {
            project_shorthand: info
                .project_shorthand
                .clone()
                .unwrap_or_else(default_project_shorthand),
            project_url: info.project_url.clone(),
            parallel: false,
        }
    }

    /// Saves the configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ExportResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ExportError::io_error(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;

        writer
            .flush()
            .map_err(|e| ExportError::io_error(path, e))?;
        Ok(())
    }

    /// Loads a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ExportResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ExportError::io_error(path, e))?;
        let reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(reader)
            .map_err(|e| ExportError::Deserialization(e.to_string()))?;
        Ok(config)
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    /// Sets the root label.
    pub fn with_project_shorthand(mut self, shorthand: impl Into<String>) -> Self {
        self.config.project_shorthand = shorthand.into();
        self
    }

    /// Sets the project base URL.
    pub fn with_project_url(mut self, url: impl Into<String>) -> Self {
        self.config.project_url = url.into();
        self
    }

    /// Enables or disables concurrent namespace export.
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.config.parallel = enabled;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ExportConfig {
        self.config
    }
}
