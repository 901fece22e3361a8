//! Top-level document dispatcher.

use std::fmt;
use std::time::{Duration, Instant};

use serde_json::Value as Json;
use shr_models::{DiagnosticCode, Diagnostics, Logger, Specifications};

use crate::config::ImportConfig;
use crate::document::str_field;
use crate::element::DataElementImporter;
use crate::error::{ImportError, ImportResult};
use crate::mapping::MappingImporter;
use crate::namespace::NamespaceImporter;
use crate::result::{ImportOutput, ImportStats};
use crate::valueset::ValueSetImporter;

/// The document kinds the importer understands, by `fileType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// `DataElement`
    DataElement,
    /// `ValueSet`
    ValueSet,
    /// `CodeSystem`
    CodeSystem,
    /// `Mapping`
    Mapping,
    /// `Namespace`
    Namespace,
    /// `ProjectInfo`
    ProjectInfo,
}

impl FileType {
    /// Every file type.
    pub const ALL: [FileType; 6] = [
        FileType::DataElement,
        FileType::ValueSet,
        FileType::CodeSystem,
        FileType::Mapping,
        FileType::Namespace,
        FileType::ProjectInfo,
    ];

    /// The `fileType` value naming this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::DataElement => "DataElement",
            FileType::ValueSet => "ValueSet",
            FileType::CodeSystem => "CodeSystem",
            FileType::Mapping => "Mapping",
            FileType::Namespace => "Namespace",
            FileType::ProjectInfo => "ProjectInfo",
        }
    }

    /// Looks up a file type by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads canonical documents and assembles [`Specifications`].
///
/// Each document is routed by its `fileType` to the matching constructor.
/// A fatal error rejects only that document; the importer keeps accepting
/// further ones. Recoverable anomalies accumulate as diagnostics.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use shr_import::Importer;
///
/// let mut importer = Importer::new();
/// let errors = importer.add_all(&[
///     json!({"fileType": "Namespace", "namespace": "demo"}),
///     json!({"fileType": "DataElement", "namespace": "demo", "name": "Bar"}),
///     json!({"fileType": "DataElement", "name": "Orphan"}),
/// ]);
/// assert_eq!(errors.len(), 1);
///
/// let output = importer.into_specifications().unwrap();
/// assert_eq!(output.specifications.data_elements.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
    elements: DataElementImporter,
    value_sets: ValueSetImporter,
    mappings: MappingImporter,
    namespaces: NamespaceImporter,
    diagnostics: Diagnostics,
    stats: ImportStats,
}

impl Importer {
    /// Creates an importer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an importer with custom configuration.
    pub fn with_config(config: ImportConfig) -> Self {
        Self {
            elements: DataElementImporter::new(config.clone()),
            config,
            ..Self::default()
        }
    }

    /// Returns a reference to the importer configuration.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Diagnostics reported so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Reads one document.
    ///
    /// # Errors
    ///
    /// - `MissingField` when `fileType` or a required identifying field is absent
    /// - `InvalidField` for an unknown `fileType` under strict configuration
    pub fn add(&mut self, doc: &Json) -> ImportResult<()> {
        let start = Instant::now();
        let result = self.dispatch(doc);
        self.stats.duration += start.elapsed();

        match &result {
            Ok(true) => self.stats.documents_read += 1,
            Ok(false) => self.stats.documents_ignored += 1,
            Err(err) => {
                self.stats.documents_failed += 1;
                tracing::error!(target: "shr", error = %err, "document rejected");
            }
        }
        result.map(|_| ())
    }

    /// Reads many documents, collecting fatal errors without stopping.
    pub fn add_all<'d>(&mut self, docs: impl IntoIterator<Item = &'d Json>) -> Vec<ImportError> {
        docs.into_iter().filter_map(|doc| self.add(doc).err()).collect()
    }

    /// Routes a document; `Ok(false)` means it was ignored.
    fn dispatch(&mut self, doc: &Json) -> ImportResult<bool> {
        let Some(name) = str_field(doc, "fileType") else {
            return Err(ImportError::MissingField {
                field: "fileType",
                context: describe(doc),
            });
        };

        let mut logger = Logger::new(&mut self.diagnostics);
        let Some(file_type) = FileType::from_name(name) else {
            if self.config.strict_file_types {
                return Err(ImportError::InvalidField {
                    field: "fileType",
                    reason: format!("unknown file type '{}'", name),
                });
            }
            logger.report(DiagnosticCode::UnknownFileType, &[("fileType", name)]);
            return Ok(false);
        };

        tracing::trace!(target: "shr", file_type = %file_type, "reading document");
        match file_type {
            FileType::DataElement => self.elements.add(doc, &mut logger)?,
            FileType::ValueSet => self.value_sets.add(doc, &mut logger)?,
            FileType::CodeSystem => self.value_sets.add_code_system(doc, &mut logger)?,
            FileType::Mapping => self.mappings.add(doc, &mut logger)?,
            FileType::Namespace => self.namespaces.add(doc, &mut logger)?,
            FileType::ProjectInfo => self.namespaces.add_project_info(doc, &mut logger)?,
        }
        Ok(true)
    }

    /// Assembles the registry from everything read.
    ///
    /// # Errors
    ///
    /// Returns `Model(DuplicateDefinition)` when two documents define the
    /// same registry key.
    pub fn into_specifications(self) -> ImportResult<ImportOutput> {
        let start = Instant::now();
        let mut specifications = Specifications::new();

        let (namespaces, project_info) = self.namespaces.into_parts();
        for namespace in namespaces {
            specifications.namespaces.add(namespace)?;
        }
        for element in self.elements.into_elements() {
            specifications.data_elements.add(element)?;
        }
        let (value_sets, code_systems) = self.value_sets.into_parts();
        for value_set in value_sets {
            specifications.value_sets.add(value_set)?;
        }
        for code_system in code_systems {
            specifications.code_systems.add(code_system)?;
        }
        for mapping in self.mappings.into_mappings() {
            specifications.maps.add(mapping)?;
        }

        let stats = ImportStats {
            duration: self.stats.duration + start.elapsed(),
            ..self.stats
        };
        tracing::info!(
            target: "shr",
            entities = specifications.len(),
            diagnostics = self.diagnostics.len(),
            failed = stats.documents_failed,
            elapsed_ms = duration_ms(stats.duration),
            "import complete"
        );

        Ok(ImportOutput {
            specifications,
            diagnostics: self.diagnostics,
            project_info,
            stats,
        })
    }
}

fn describe(doc: &Json) -> String {
    match (str_field(doc, "namespace"), str_field(doc, "name")) {
        (Some(ns), Some(name)) => format!("document {}.{}", ns, name),
        (Some(ns), None) => format!("document in namespace {}", ns),
        _ => "document".to_string(),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
