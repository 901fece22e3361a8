//! Identifiers for elements, value sets and primitive types.

use std::fmt;

use crate::error::{ModelError, ModelResult};

/// Namespace reported by primitive identifiers.
pub const PRIMITIVE_NS: &str = "primitive";

/// The fixed set of primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Primitive {
    /// `boolean`
    Boolean,
    /// `integer`
    Integer,
    /// `decimal`
    Decimal,
    /// `string`
    String,
    /// `code`
    Code,
    /// `id`
    Id,
    /// `oid`
    Oid,
    /// `uri`
    Uri,
    /// `date`
    Date,
    /// `dateTime`
    DateTime,
    /// `instant`
    Instant,
    /// `time`
    Time,
    /// `base64Binary`
    Base64Binary,
    /// `markdown`
    Markdown,
    /// `unsignedInt`
    UnsignedInt,
    /// `positiveInt`
    PositiveInt,
}

impl Primitive {
    /// Every primitive, in declaration order.
    pub const ALL: [Primitive; 16] = [
        Primitive::Boolean,
        Primitive::Integer,
        Primitive::Decimal,
        Primitive::String,
        Primitive::Code,
        Primitive::Id,
        Primitive::Oid,
        Primitive::Uri,
        Primitive::Date,
        Primitive::DateTime,
        Primitive::Instant,
        Primitive::Time,
        Primitive::Base64Binary,
        Primitive::Markdown,
        Primitive::UnsignedInt,
        Primitive::PositiveInt,
    ];

    /// Returns the canonical spelling of this primitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Integer => "integer",
            Primitive::Decimal => "decimal",
            Primitive::String => "string",
            Primitive::Code => "code",
            Primitive::Id => "id",
            Primitive::Oid => "oid",
            Primitive::Uri => "uri",
            Primitive::Date => "date",
            Primitive::DateTime => "dateTime",
            Primitive::Instant => "instant",
            Primitive::Time => "time",
            Primitive::Base64Binary => "base64Binary",
            Primitive::Markdown => "markdown",
            Primitive::UnsignedInt => "unsignedInt",
            Primitive::PositiveInt => "positiveInt",
        }
    }

    /// Looks up a primitive by its canonical spelling (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an element, value set, code system or primitive type.
///
/// Identifiers are immutable value objects compared structurally.
///
/// # Examples
///
/// ```rust
/// use shr_models::Identifier;
///
/// let id = Identifier::parse_fqn("demo.Bar").unwrap();
/// assert_eq!(id.namespace(), "demo");
/// assert_eq!(id.name(), "Bar");
/// assert_eq!(id.fqn(), "demo:Bar");
///
/// let prim = Identifier::parse_fqn("string").unwrap();
/// assert!(prim.is_primitive());
/// assert_eq!(prim.fqn(), "primitive:string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Identifier {
    /// A namespaced element name.
    Qualified {
        /// Owning namespace (may itself contain dots).
        namespace: String,
        /// Local name.
        name: String,
    },

    /// One of the built-in primitive types.
    Primitive(Primitive),

    /// Unresolved text standing in for a real identifier.
    Placeholder {
        /// The placeholder text.
        text: String,
        /// Whether the placeholder was marked to-be-determined.
        tbd: bool,
    },
}

impl Identifier {
    /// Creates a namespaced identifier.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Identifier::Qualified {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Creates a primitive identifier.
    pub fn primitive(primitive: Primitive) -> Self {
        Identifier::Primitive(primitive)
    }

    /// Creates a plain placeholder identifier.
    pub fn placeholder(text: impl Into<String>) -> Self {
        Identifier::Placeholder {
            text: text.into(),
            tbd: false,
        }
    }

    /// Creates a placeholder identifier marked to-be-determined.
    pub fn tbd(text: impl Into<String>) -> Self {
        Identifier::Placeholder {
            text: text.into(),
            tbd: true,
        }
    }

    /// Reads an identifier from its textual form.
    ///
    /// Accepts dotted canonical names (`shr.core.Quantity`), colon-separated
    /// FQNs (`shr.core:Quantity`) and bare primitive names (`dateTime`).
    /// The namespace is everything before the last separator.
    pub fn parse_fqn(text: &str) -> ModelResult<Self> {
        let text = text.trim();
        if let Some(primitive) = Primitive::from_name(text) {
            return Ok(Identifier::Primitive(primitive));
        }

        let split = text.rfind(':').or_else(|| text.rfind('.'));
        let Some(idx) = split else {
            return Err(ModelError::InvalidIdentifier(text.to_string()));
        };

        let (namespace, name) = (&text[..idx], &text[idx + 1..]);
        if namespace.is_empty() || name.is_empty() {
            return Err(ModelError::InvalidIdentifier(text.to_string()));
        }
        if namespace == PRIMITIVE_NS {
            return Primitive::from_name(name)
                .map(Identifier::Primitive)
                .ok_or_else(|| ModelError::InvalidIdentifier(text.to_string()));
        }

        Ok(Identifier::new(namespace, name))
    }

    /// Returns the namespace (`primitive` for primitives, empty for placeholders).
    pub fn namespace(&self) -> &str {
        match self {
            Identifier::Qualified { namespace, .. } => namespace,
            Identifier::Primitive(_) => PRIMITIVE_NS,
            Identifier::Placeholder { .. } => "",
        }
    }

    /// Returns the local name (the text for placeholders).
    pub fn name(&self) -> &str {
        match self {
            Identifier::Qualified { name, .. } => name,
            Identifier::Primitive(p) => p.as_str(),
            Identifier::Placeholder { text, .. } => text,
        }
    }

    /// Returns true for primitive identifiers.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Identifier::Primitive(_))
    }

    /// Returns true for placeholder identifiers.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Identifier::Placeholder { .. })
    }

    /// Returns the fully-qualified name.
    ///
    /// `namespace:name` for qualified identifiers, `primitive:name` for
    /// primitives, `TBD(text)` or the bare text for placeholders.
    pub fn fqn(&self) -> String {
        match self {
            Identifier::Qualified { namespace, name } => format!("{}:{}", namespace, name),
            Identifier::Primitive(p) => format!("{}:{}", PRIMITIVE_NS, p),
            Identifier::Placeholder { text, tbd: true } => format!("TBD({})", text),
            Identifier::Placeholder { text, tbd: false } => text.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn())
    }
}

/// Renders a structural path as `fqn:fqn:...`.
pub fn render_path(path: &[Identifier]) -> String {
    path.iter().map(Identifier::fqn).collect::<Vec<_>>().join(":")
}
