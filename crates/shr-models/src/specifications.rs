//! The specifications registry: ordered, FQN-indexed entity collections.

use hashbrown::HashMap;

use crate::element::DataElement;
use crate::error::{ModelError, ModelResult};
use crate::identifier::Identifier;
use crate::mapping::{mapping_key, ElementMapping};
use crate::namespace::Namespace;
use crate::vocabulary::{CodeSystem, ValueSet};

// ============================================================================
// Entity trait
// ============================================================================

/// An entity that can be stored in an [`EntityCollection`].
pub trait Entity {
    /// Human-readable entity kind, used in duplicate-definition errors.
    const KIND: &'static str;

    /// Unique key within the collection.
    fn registry_key(&self) -> String;

    /// Namespace the entity belongs to.
    fn namespace(&self) -> &str;
}

impl Entity for Namespace {
    const KIND: &'static str = "namespace";

    fn registry_key(&self) -> String {
        self.name.clone()
    }

    fn namespace(&self) -> &str {
        &self.name
    }
}

impl Entity for DataElement {
    const KIND: &'static str = "data element";

    fn registry_key(&self) -> String {
        self.identifier.fqn()
    }

    fn namespace(&self) -> &str {
        self.identifier.namespace()
    }
}

impl Entity for ValueSet {
    const KIND: &'static str = "value set";

    fn registry_key(&self) -> String {
        self.identifier.fqn()
    }

    fn namespace(&self) -> &str {
        self.identifier.namespace()
    }
}

impl Entity for CodeSystem {
    const KIND: &'static str = "code system";

    fn registry_key(&self) -> String {
        self.identifier.fqn()
    }

    fn namespace(&self) -> &str {
        self.identifier.namespace()
    }
}

impl Entity for ElementMapping {
    const KIND: &'static str = "mapping";

    fn registry_key(&self) -> String {
        self.key()
    }

    fn namespace(&self) -> &str {
        self.source.namespace()
    }
}

// ============================================================================
// EntityCollection
// ============================================================================

/// Insertion-ordered entities with an O(1) key index.
///
/// With the `serde` feature the collection serializes as its item sequence;
/// deserializing rebuilds the index through [`add`](Self::add), so duplicate
/// keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCollection<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity> EntityCollection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDefinition` if the key is taken; the collection is
    /// left unchanged.
    pub fn add(&mut self, entity: T) -> ModelResult<()> {
        let key = entity.registry_key();
        if self.index.contains_key(&key) {
            return Err(ModelError::DuplicateDefinition { kind: T::KIND, key });
        }
        self.index.insert(key, self.items.len());
        self.items.push(entity);
        Ok(())
    }

    /// Looks up by registry key.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).and_then(|&i| self.items.get(i))
    }

    /// Looks up by identifier FQN.
    pub fn find(&self, identifier: &Identifier) -> Option<&T> {
        self.get(&identifier.fqn())
    }

    /// Returns true if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entities of one namespace, in insertion order.
    pub fn by_namespace<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        self.items.iter().filter(move |e| e.namespace() == namespace)
    }

    /// Distinct namespace names, in first-insertion order.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entity in &self.items {
            let ns = entity.namespace();
            if !seen.contains(&ns) {
                seen.push(ns);
            }
        }
        seen
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl EntityCollection<DataElement> {
    /// Entry elements only, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &DataElement> {
        self.items.iter().filter(|e| e.is_entry)
    }
}

impl EntityCollection<ElementMapping> {
    /// Looks up the mapping of `source` onto `target_spec`.
    pub fn find_by_target_and_source(
        &self,
        target_spec: &str,
        source: &Identifier,
    ) -> Option<&ElementMapping> {
        self.get(&mapping_key(target_spec, source))
    }

    /// Every mapping onto `target_spec`, in insertion order.
    pub fn by_target<'a>(
        &'a self,
        target_spec: &'a str,
    ) -> impl Iterator<Item = &'a ElementMapping> + 'a {
        self.items.iter().filter(move |m| m.target_spec == target_spec)
    }
}

impl<'a, T> IntoIterator for &'a EntityCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for EntityCollection<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for EntityCollection<T>
where
    T: Entity + serde::Deserialize<'de>,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut collection = Self::new();
        for item in items {
            collection.add(item).map_err(serde::de::Error::custom)?;
        }
        Ok(collection)
    }
}

// ============================================================================
// Specifications
// ============================================================================

/// Every entity of one compilation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Specifications {
    /// Namespaces keyed by name.
    pub namespaces: EntityCollection<Namespace>,
    /// Data elements keyed by FQN.
    pub data_elements: EntityCollection<DataElement>,
    /// Value sets keyed by FQN.
    pub value_sets: EntityCollection<ValueSet>,
    /// Code systems keyed by FQN.
    pub code_systems: EntityCollection<CodeSystem>,
    /// Mappings keyed by `{targetSpec}/{source FQN}`.
    pub maps: EntityCollection<ElementMapping>,
}

impl Specifications {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registered entities.
    pub fn len(&self) -> usize {
        self.namespaces.len()
            + self.data_elements.len()
            + self.value_sets.len()
            + self.code_systems.len()
            + self.maps.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
