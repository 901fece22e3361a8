//! Coded concepts from external coding systems.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A single coded term: `(system, code, display)`.
///
/// Equality and hashing consider only `system` and `code`.
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Concept {
    /// Coding system URI.
    pub system: String,
    /// Code within the system.
    pub code: String,
    /// Optional human-readable display text.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display: Option<String>,
}

impl Concept {
    /// Creates a concept without display text.
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: None,
        }
    }

    /// Sets the display text.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Renders `"{display} ({system}:{code})"`, or `"{system}:{code}"` without display.
    pub fn label(&self) -> String {
        match &self.display {
            Some(display) => format!("{} ({}:{})", display, self.system, self.code),
            None => format!("{}:{}", self.system, self.code),
        }
    }
}

impl PartialEq for Concept {
    fn eq(&self, other: &Self) -> bool {
        self.system == other.system && self.code == other.code
    }
}

impl Hash for Concept {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.system.hash(state);
        self.code.hash(state);
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNOMED: &str = "http://snomed.info/sct";

    #[test]
    fn test_label_with_display() {
        let c = Concept::new(SNOMED, "73211009").with_display("Diabetes mellitus");
        assert_eq!(c.label(), "Diabetes mellitus (http://snomed.info/sct:73211009)");
    }

    #[test]
    fn test_label_without_display() {
        let c = Concept::new(SNOMED, "73211009");
        assert_eq!(c.label(), "http://snomed.info/sct:73211009");
    }

    #[test]
    fn test_equality_ignores_display() {
        let a = Concept::new(SNOMED, "73211009").with_display("Diabetes");
        let b = Concept::new(SNOMED, "73211009");
        assert_eq!(a, b);
        assert_ne!(a, Concept::new("http://loinc.org", "73211009"));
    }
}
