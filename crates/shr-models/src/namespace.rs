//! Namespaces and run-wide project information.

/// A namespace grouping element, value-set and code-system definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Namespace {
    /// Namespace name (e.g. `shr.core`).
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Grammar versions the namespace's sources were written in.
    pub grammar_versions: Vec<String>,
}

impl Namespace {
    /// Creates a namespace without description or versions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            grammar_versions: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Run-wide project configuration carried by `ProjectInfo` documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProjectInfo {
    /// Base URL under which project code systems and value sets live.
    #[cfg_attr(feature = "serde", serde(rename = "projectURL"))]
    pub project_url: String,
    /// Short project name, used as the root label of exported trees.
    pub project_shorthand: Option<String>,
    /// Full project name.
    pub project_name: Option<String>,
}

impl ProjectInfo {
    /// Creates project info with only a base URL.
    pub fn new(project_url: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            project_shorthand: None,
            project_name: None,
        }
    }
}
