//! Cardinality ranges and their override history.

use std::fmt;

use crate::error::{ModelError, ModelResult};
use crate::identifier::Identifier;

/// An occurrence range: `min..max`, with `max = None` meaning unbounded.
///
/// The invariant `max >= min` holds for every constructed value.
///
/// # Examples
///
/// ```rust
/// use shr_models::Cardinality;
///
/// let card = Cardinality::new(0, Some(1)).unwrap();
/// assert_eq!(card.to_string(), "0..1");
/// assert!(Cardinality::new(2, Some(1)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCardinality"))]
pub struct Cardinality {
    min: u32,
    max: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    history: Vec<CardinalityHistoryEntry>,
}

/// One prior cardinality in an inheritance chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardinalityHistoryEntry {
    /// The cardinality as declared at `source`.
    pub cardinality: Cardinality,
    /// The element that declared it.
    pub source: Identifier,
}

/// Unchecked wire form; deserialization goes through [`Cardinality::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCardinality {
    min: u32,
    #[serde(default)]
    max: Option<u32>,
    #[serde(default)]
    history: Vec<CardinalityHistoryEntry>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCardinality> for Cardinality {
    type Error = ModelError;

    fn try_from(raw: RawCardinality) -> ModelResult<Self> {
        Ok(Cardinality::new(raw.min, raw.max)?.with_history(raw.history))
    }
}

impl Cardinality {
    /// Creates a cardinality, rejecting `min > max`.
    pub fn new(min: u32, max: Option<u32>) -> ModelResult<Self> {
        if let Some(max) = max {
            if max < min {
                return Err(ModelError::InvalidCardinality { min, max });
            }
        }
        Ok(Self {
            min,
            max,
            history: Vec::new(),
        })
    }

    /// `0..1`
    pub fn zero_or_one() -> Self {
        Self::fixed(0, Some(1))
    }

    /// `1..1`
    pub fn exactly_one() -> Self {
        Self::fixed(1, Some(1))
    }

    /// `0..*`
    pub fn zero_or_more() -> Self {
        Self::fixed(0, None)
    }

    /// `1..*`
    pub fn one_or_more() -> Self {
        Self::fixed(1, None)
    }

    fn fixed(min: u32, max: Option<u32>) -> Self {
        Self {
            min,
            max,
            history: Vec::new(),
        }
    }

    /// Attaches an override history, replacing any existing one.
    pub fn with_history(mut self, history: Vec<CardinalityHistoryEntry>) -> Self {
        self.history = history;
        self
    }

    /// Minimum occurrences.
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Maximum occurrences (`None` = unbounded).
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Prior cardinalities, oldest first. Empty when no history was recorded.
    pub fn history(&self) -> &[CardinalityHistoryEntry] {
        &self.history
    }

    /// Returns a copy without history, for range-only comparisons.
    pub fn without_history(&self) -> Self {
        Self::fixed(self.min, self.max)
    }

    /// Returns true when more than one occurrence is allowed.
    pub fn is_list(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }

    /// Returns true when zero occurrences are allowed.
    pub fn is_optional(&self) -> bool {
        self.min == 0
    }

    /// `1..1`
    pub fn is_exactly_one(&self) -> bool {
        self.min == 1 && self.max == Some(1)
    }

    /// `0..1`
    pub fn is_zero_or_one(&self) -> bool {
        self.min == 0 && self.max == Some(1)
    }

    /// Returns true if this range lies entirely inside `other`.
    pub fn fits_within(&self, other: &Cardinality) -> bool {
        if self.min < other.min {
            return false;
        }
        match (self.max, other.max) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(mine), Some(theirs)) => mine <= theirs,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_min_above_max() {
        assert_eq!(
            Cardinality::new(3, Some(2)),
            Err(ModelError::InvalidCardinality { min: 3, max: 2 })
        );
        assert!(Cardinality::new(2, Some(2)).is_ok());
        assert!(Cardinality::new(5, None).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(Cardinality::exactly_one().to_string(), "1..1");
        assert_eq!(Cardinality::zero_or_more().to_string(), "0..*");
    }

    #[test]
    fn test_predicates() {
        assert!(Cardinality::zero_or_more().is_list());
        assert!(!Cardinality::zero_or_one().is_list());
        assert!(Cardinality::zero_or_one().is_optional());
        assert!(Cardinality::zero_or_one().is_zero_or_one());
        assert!(Cardinality::exactly_one().is_exactly_one());
        assert!(!Cardinality::one_or_more().is_optional());
    }

    #[test]
    fn test_fits_within() {
        let narrow = Cardinality::exactly_one();
        let wide = Cardinality::zero_or_more();
        assert!(narrow.fits_within(&wide));
        assert!(!wide.fits_within(&narrow));
        assert!(Cardinality::one_or_more().fits_within(&wide));
        assert!(!Cardinality::one_or_more().fits_within(&Cardinality::new(0, Some(5)).unwrap()));
    }

    #[test]
    fn test_history_is_kept_in_order() {
        let history = vec![
            CardinalityHistoryEntry {
                cardinality: Cardinality::zero_or_more(),
                source: Identifier::new("demo", "Base"),
            },
            CardinalityHistoryEntry {
                cardinality: Cardinality::exactly_one(),
                source: Identifier::new("demo", "Derived"),
            },
        ];
        let card = Cardinality::zero_or_more().with_history(history.clone());
        assert_eq!(card.history(), history.as_slice());
        assert!(card.without_history().history().is_empty());
        assert_ne!(card, Cardinality::zero_or_more());
    }
}
