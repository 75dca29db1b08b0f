//! Object collection module - the persistent, display-ordered object set

use crate::identity::normalize;
use crate::object::{NarrativeObject, Timestamp};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// The set of narrative objects currently shown to the user
///
/// Objects are keyed by normalized identity. Display order is kept separately:
/// existing objects keep their position, new objects are appended, and the
/// order is never re-sorted by content. Only the reconciliation functions in
/// [`crate::reconcile`] produce new collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectCollection {
    entries: HashMap<String, NarrativeObject>,
    order: Vec<String>,
}

/// Summary statistics over a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    /// Number of objects
    pub total_objects: usize,

    /// Number of relationships across all objects
    pub total_relationships: usize,

    /// Mean relationships per object (0.0 when empty)
    pub avg_relationships_per_object: f64,

    /// Objects with at least one relationship
    pub objects_with_relationships: usize,

    /// Earliest created object
    pub oldest: Option<(String, Timestamp)>,

    /// Most recently created object
    pub newest: Option<(String, Timestamp)>,
}

/// Serializes as a list of objects in display order
impl Serialize for ObjectCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl ObjectCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an object by name, ignoring casing and surrounding whitespace
    pub fn get(&self, name: &str) -> Option<&NarrativeObject> {
        self.entries.get(&normalize(name))
    }

    /// True if an object with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize(name))
    }

    /// Iterate objects in display order
    pub fn iter(&self) -> impl Iterator<Item = &NarrativeObject> + '_ {
        self.order.iter().filter_map(move |key| self.entries.get(key))
    }

    /// Display names in display order
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(NarrativeObject::name).collect()
    }

    /// Position of an object in display order
    pub fn position(&self, name: &str) -> Option<usize> {
        let key = normalize(name);
        self.order.iter().position(|k| *k == key)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if there are no objects
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Compute summary statistics
    pub fn statistics(&self) -> CollectionStats {
        let total_objects = self.len();
        let total_relationships: usize = self.iter().map(|o| o.relationships.len()).sum();
        let objects_with_relationships = self.iter().filter(|o| !o.relationships.is_empty()).count();

        let avg_relationships_per_object = if total_objects == 0 {
            0.0
        } else {
            total_relationships as f64 / total_objects as f64
        };

        // Ties resolve to display order: first for oldest, last for newest.
        let oldest = self
            .iter()
            .fold(None::<&NarrativeObject>, |best, o| match best {
                Some(b) if b.created_at <= o.created_at => Some(b),
                _ => Some(o),
            })
            .map(|o| (o.name().to_string(), o.created_at));
        let newest = self
            .iter()
            .fold(None::<&NarrativeObject>, |best, o| match best {
                Some(b) if b.created_at > o.created_at => Some(b),
                _ => Some(o),
            })
            .map(|o| (o.name().to_string(), o.created_at));

        CollectionStats {
            total_objects,
            total_relationships,
            avg_relationships_per_object,
            objects_with_relationships,
            oldest,
            newest,
        }
    }

    /// Append an object at the end of display order
    ///
    /// An existing entry with the same identity is replaced in place instead.
    pub(crate) fn push(&mut self, object: NarrativeObject) {
        let key = object.identity.key().to_string();
        if self.entries.insert(key.clone(), object).is_none() {
            self.order.push(key);
        }
    }

    /// Mutable access by normalized key
    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut NarrativeObject> {
        self.entries.get_mut(key)
    }

    /// Remove an object and its display position
    pub(crate) fn remove(&mut self, key: &str) -> Option<NarrativeObject> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Put an object at a specific display position
    pub(crate) fn insert_at(&mut self, index: usize, object: NarrativeObject) {
        let key = object.identity.key().to_string();
        if self.entries.insert(key.clone(), object).is_none() {
            let index = index.min(self.order.len());
            self.order.insert(index, key);
        }
    }

    /// Check that map keys and display order agree
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        use std::collections::HashSet;
        let unique: HashSet<&String> = self.order.iter().collect();
        unique.len() == self.order.len()
            && self.order.len() == self.entries.len()
            && self.order.iter().all(|k| self.entries.contains_key(k))
    }
}
