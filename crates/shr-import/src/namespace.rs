//! Namespace and project-info construction.

use serde_json::Value as Json;
use shr_models::{Logger, Namespace, ProjectInfo};

use crate::document::{array_field, require_str, str_field};
use crate::error::ImportResult;

/// Accumulates [`Namespace`]s and the run's [`ProjectInfo`].
#[derive(Debug, Clone, Default)]
pub struct NamespaceImporter {
    namespaces: Vec<Namespace>,
    project_info: Option<ProjectInfo>,
}

impl NamespaceImporter {
    /// Creates an empty importer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one `Namespace` document.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when `namespace` is absent.
    pub fn add(&mut self, doc: &Json, _logger: &mut Logger<'_>) -> ImportResult<()> {
        let name = require_str(doc, "namespace", "Namespace")?;
        let mut namespace = Namespace::new(name);
        namespace.description = str_field(doc, "description").map(str::to_string);
        namespace.grammar_versions = array_field(doc, "grammarVersions")
            .iter()
            .filter_map(|v| match v {
                Json::String(s) => Some(s.clone()),
                Json::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();

        self.namespaces.push(namespace);
        Ok(())
    }

    /// Reads one `ProjectInfo` document, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when `projectURL` is absent.
    pub fn add_project_info(&mut self, doc: &Json, _logger: &mut Logger<'_>) -> ImportResult<()> {
        let url = require_str(doc, "projectURL", "ProjectInfo")?;
        let mut info = ProjectInfo::new(url);
        info.project_shorthand = str_field(doc, "projectShorthand").map(str::to_string);
        info.project_name = str_field(doc, "projectName").map(str::to_string);

        if self.project_info.is_some() {
            tracing::debug!(target: "shr", url, "replacing earlier project info");
        }
        self.project_info = Some(info);
        Ok(())
    }

    /// Namespaces read so far.
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// The last project info read, if any.
    pub fn project_info(&self) -> Option<&ProjectInfo> {
        self.project_info.as_ref()
    }

    /// Consumes the importer.
    pub fn into_parts(self) -> (Vec<Namespace>, Option<ProjectInfo>) {
        (self.namespaces, self.project_info)
    }
}
