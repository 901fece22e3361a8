//! Structured diagnostics for recoverable anomalies.
//!
//! Import and export never abort on a malformed unit (an unknown constraint
//! key, a choice field, an unrecognized coding system). They report a
//! [`Diagnostic`] through a [`Logger`] and carry on. The logger is an explicit
//! handle: scoped context is added with [`Logger::child`] and disappears when
//! the child is dropped.
//!
//! Every report is also emitted as a `tracing` event under the `shr` target.
//!
//! # Example
//!
//! ```rust
//! use shr_models::{DiagnosticCode, Diagnostics, Logger};
//!
//! let mut diagnostics = Diagnostics::new();
//! {
//!     let mut logger = Logger::new(&mut diagnostics);
//!     let mut element = logger.child("element", "demo:Foo");
//!     element.warn(DiagnosticCode::UnknownConstraintKind, &[("key", "mystery")]);
//! }
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics.iter().next().unwrap().get("element"), Some("demo:Foo"));
//! ```

use std::fmt;

/// How serious a recoverable anomaly is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Output is still complete.
    Warning,
    /// A unit was dropped from the output.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Kinds of recoverable anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticCode {
    /// A document whose `fileType` is not recognized.
    UnknownFileType,
    /// A value whose `valueType` is not recognized.
    UnknownValueType,
    /// A constraint key that names no known constraint kind.
    UnknownConstraintKind,
    /// A mapping rule group that is not recognized.
    UnknownMappingRule,
    /// A value-set rule type that is not recognized.
    UnknownValueSetRule,
    /// A value record missing a required part.
    MalformedValue,
    /// A constraint record missing a required part.
    MalformedConstraint,
    /// A cardinality that is missing, non-numeric or inverted.
    MalformedCardinality,
    /// Text that cannot be read as an identifier.
    InvalidIdentifier,
    /// A field declared as a choice.
    ChoiceField,
    /// A coding system with no known browsable URL.
    UnknownCodeSystem,
    /// A mapping rule missing a required part.
    MalformedMappingRule,
    /// A value-set rule missing a required part.
    MalformedValueSetRule,
    /// A concept of an element, value set or code system missing its system or code.
    MalformedConcept,
}

impl DiagnosticCode {
    /// Stable numeric code, suitable for matching in external tooling.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::UnknownFileType => "11001",
            DiagnosticCode::UnknownValueType => "11002",
            DiagnosticCode::UnknownConstraintKind => "11003",
            DiagnosticCode::UnknownMappingRule => "11004",
            DiagnosticCode::UnknownValueSetRule => "11005",
            DiagnosticCode::MalformedValue => "11101",
            DiagnosticCode::MalformedConstraint => "11102",
            DiagnosticCode::MalformedCardinality => "11103",
            DiagnosticCode::InvalidIdentifier => "11104",
            DiagnosticCode::ChoiceField => "11105",
            DiagnosticCode::MalformedMappingRule => "11106",
            DiagnosticCode::MalformedValueSetRule => "11107",
            DiagnosticCode::MalformedConcept => "11108",
            DiagnosticCode::UnknownCodeSystem => "12001",
        }
    }

    /// Default severity when reported without an explicit one.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::UnknownCodeSystem => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Returns the variant name.
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticCode::UnknownFileType => "UnknownFileType",
            DiagnosticCode::UnknownValueType => "UnknownValueType",
            DiagnosticCode::UnknownConstraintKind => "UnknownConstraintKind",
            DiagnosticCode::UnknownMappingRule => "UnknownMappingRule",
            DiagnosticCode::UnknownValueSetRule => "UnknownValueSetRule",
            DiagnosticCode::MalformedValue => "MalformedValue",
            DiagnosticCode::MalformedConstraint => "MalformedConstraint",
            DiagnosticCode::MalformedCardinality => "MalformedCardinality",
            DiagnosticCode::InvalidIdentifier => "InvalidIdentifier",
            DiagnosticCode::ChoiceField => "ChoiceField",
            DiagnosticCode::UnknownCodeSystem => "UnknownCodeSystem",
            DiagnosticCode::MalformedMappingRule => "MalformedMappingRule",
            DiagnosticCode::MalformedValueSetRule => "MalformedValueSetRule",
            DiagnosticCode::MalformedConcept => "MalformedConcept",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// One reported anomaly: a code plus `(key, value)` context fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// What went wrong.
    pub code: DiagnosticCode,
    /// How serious it is.
    pub severity: Severity,
    /// Context fields, outermost scope first.
    pub context: Vec<(String, String)>,
}

impl Diagnostic {
    /// Returns the innermost value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity, self.code)?;
        for (key, value) in &self.context {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Append-only collector of diagnostics, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Appends every diagnostic of `other`, preserving its order.
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Iterates in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of reports.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of reports with the given code.
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.items.iter().filter(|d| d.code == code).count()
    }

    /// Returns true if any report has `Error` severity.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    /// Consumes the collector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Scoped reporting handle over a [`Diagnostics`] collector.
#[derive(Debug)]
pub struct Logger<'a> {
    sink: &'a mut Diagnostics,
    context: Vec<(String, String)>,
}

impl<'a> Logger<'a> {
    /// Creates a root logger with no context.
    pub fn new(sink: &'a mut Diagnostics) -> Self {
        Self {
            sink,
            context: Vec::new(),
        }
    }

    /// Creates a root logger that starts from an existing context.
    ///
    /// Used to report into a separate collector on behalf of a parent scope.
    pub fn with_context(sink: &'a mut Diagnostics, context: Vec<(String, String)>) -> Self {
        Self { sink, context }
    }

    /// Appends diagnostics gathered in another collector, in order.
    pub fn absorb(&mut self, diagnostics: Diagnostics) {
        self.sink.merge(diagnostics);
    }

    /// Returns a logger that adds `key = value` to every report.
    pub fn child(&mut self, key: &str, value: impl Into<String>) -> Logger<'_> {
        let mut context = self.context.clone();
        context.push((key.to_string(), value.into()));
        Logger {
            sink: &mut *self.sink,
            context,
        }
    }

    /// Context fields of this scope, outermost first.
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Reports at the code's default severity.
    pub fn report(&mut self, code: DiagnosticCode, fields: &[(&str, &str)]) {
        self.emit(code, code.default_severity(), fields);
    }

    /// Reports a warning.
    pub fn warn(&mut self, code: DiagnosticCode, fields: &[(&str, &str)]) {
        self.emit(code, Severity::Warning, fields);
    }

    /// Reports an error.
    pub fn error(&mut self, code: DiagnosticCode, fields: &[(&str, &str)]) {
        self.emit(code, Severity::Error, fields);
    }

    fn emit(&mut self, code: DiagnosticCode, severity: Severity, fields: &[(&str, &str)]) {
        let mut context = self.context.clone();
        context.extend(fields.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let diagnostic = Diagnostic {
            code,
            severity,
            context,
        };

        let rendered = render_context(&diagnostic.context);
        match severity {
            Severity::Warning => tracing::warn!(
                target: "shr",
                code = code.code(),
                context = %rendered,
                "{}",
                code.name()
            ),
            Severity::Error => tracing::error!(
                target: "shr",
                code = code.code(),
                context = %rendered,
                "{}",
                code.name()
            ),
        }

        self.sink.push(diagnostic);
    }
}

fn render_context(context: &[(String, String)]) -> String {
    context
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_context_is_scoped() {
        let mut diagnostics = Diagnostics::new();
        {
            let mut root = Logger::new(&mut diagnostics);
            {
                let mut child = root.child("namespace", "demo");
                let mut grandchild = child.child("element", "demo:Foo");
                grandchild.report(DiagnosticCode::ChoiceField, &[]);
            }
            root.report(DiagnosticCode::UnknownFileType, &[("fileType", "Widget")]);
        }

        let items: Vec<_> = diagnostics.iter().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("namespace"), Some("demo"));
        assert_eq!(items[0].get("element"), Some("demo:Foo"));
        assert_eq!(items[1].get("namespace"), None);
        assert_eq!(items[1].get("fileType"), Some("Widget"));
    }

    #[test]
    fn test_severity_and_counts() {
        let mut diagnostics = Diagnostics::new();
        {
            let mut logger = Logger::new(&mut diagnostics);
            logger.report(DiagnosticCode::UnknownCodeSystem, &[("system", "urn:x")]);
            logger.warn(DiagnosticCode::UnknownCodeSystem, &[("system", "urn:y")]);
        }
        assert_eq!(diagnostics.count(DiagnosticCode::UnknownCodeSystem), 2);
        assert!(!diagnostics.has_errors());

        {
            let mut logger = Logger::new(&mut diagnostics);
            logger.error(DiagnosticCode::MalformedValue, &[]);
        }
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_codes_are_unique() {
        let all = [
            DiagnosticCode::UnknownFileType,
            DiagnosticCode::UnknownValueType,
            DiagnosticCode::UnknownConstraintKind,
            DiagnosticCode::UnknownMappingRule,
            DiagnosticCode::UnknownValueSetRule,
            DiagnosticCode::MalformedValue,
            DiagnosticCode::MalformedConstraint,
            DiagnosticCode::MalformedCardinality,
            DiagnosticCode::InvalidIdentifier,
            DiagnosticCode::ChoiceField,
            DiagnosticCode::UnknownCodeSystem,
            DiagnosticCode::MalformedMappingRule,
            DiagnosticCode::MalformedValueSetRule,
            DiagnosticCode::MalformedConcept,
        ];
        let mut codes: Vec<_> = all.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic {
            code: DiagnosticCode::UnknownConstraintKind,
            severity: Severity::Error,
            context: vec![("key".to_string(), "mystery".to_string())],
        };
        assert_eq!(
            diagnostic.to_string(),
            "error UnknownConstraintKind (11003) key=mystery"
        );
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut first = Diagnostics::new();
        Logger::new(&mut first).report(DiagnosticCode::MalformedValue, &[]);
        let mut second = Diagnostics::new();
        Logger::new(&mut second).report(DiagnosticCode::ChoiceField, &[]);

        first.merge(second);
        let codes: Vec<_> = first.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::MalformedValue, DiagnosticCode::ChoiceField]);
    }

    #[test]
    fn test_detached_logger_keeps_parent_context() {
        let mut diagnostics = Diagnostics::new();
        let mut root = Logger::new(&mut diagnostics);
        let parent = root.child("namespace", "demo");

        let mut local = Diagnostics::new();
        Logger::with_context(&mut local, parent.context().to_vec())
            .warn(DiagnosticCode::UnknownCodeSystem, &[("system", "urn:x")]);
        drop(parent);
        root.absorb(local);

        let item = diagnostics.iter().next().unwrap();
        assert_eq!(item.get("namespace"), Some("demo"));
        assert_eq!(item.get("system"), Some("urn:x"));
    }
}
