//! Reconciliation - merging a fresh extraction result into the collection
//!
//! The extraction service re-derives its whole understanding on every call,
//! so a result is treated as a full replacement of the object set:
//!
//! - identities only in the result are **added** at the end of display order
//! - identities only in the collection are **removed**
//! - identities in both are **updated in place**, keeping position, display
//!   casing and `created_at`; `updated_at` moves only when content changes
//!
//! Every function here is pure: the same inputs always produce the same
//! output, and the clock is passed in by the caller.

use crate::collection::ObjectCollection;
use crate::extraction::{ExtractedObject, ExtractionResult};
use crate::identity::Identity;
use crate::object::{NarrativeObject, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// When an object missing from a result is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// Delete as soon as one applied result omits the object
    #[default]
    Immediate,

    /// Tolerate this many consecutive omissions before deleting
    Grace {
        /// Omissions tolerated; the next one deletes
        misses: u32,
    },
}

impl DeletionPolicy {
    fn tolerated_misses(&self) -> u32 {
        match self {
            DeletionPolicy::Immediate => 0,
            DeletionPolicy::Grace { misses } => *misses,
        }
    }
}

/// What a merge changed, by display name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Newly added objects
    pub added: Vec<String>,

    /// Objects whose description or relationships changed
    pub updated: Vec<String>,

    /// Objects present in both with identical content
    pub unchanged: usize,

    /// Objects deleted
    pub removed: Vec<String>,

    /// Objects missing from the result but kept by a grace policy
    pub retained: Vec<String>,
}

impl MergeSummary {
    /// True if the merge left every object's content as it was
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// The outcome of a merge
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    /// The next collection
    pub collection: ObjectCollection,

    /// What changed relative to the previous collection
    pub summary: MergeSummary,
}

/// Merge a result into a collection, deleting missing objects immediately
pub fn reconcile(old: &ObjectCollection, result: &ExtractionResult, now: Timestamp) -> Merge {
    reconcile_with(old, result, now, DeletionPolicy::Immediate)
}

/// Merge a result into a collection under an explicit deletion policy
pub fn reconcile_with(
    old: &ObjectCollection,
    result: &ExtractionResult,
    now: Timestamp,
    policy: DeletionPolicy,
) -> Merge {
    let incoming = distinct_candidates(result);
    let by_key: HashMap<&str, &ExtractedObject> = incoming
        .iter()
        .map(|(identity, candidate)| (identity.key(), *candidate))
        .collect();

    let mut next = ObjectCollection::new();
    let mut summary = MergeSummary::default();

    for existing in old.iter() {
        match by_key.get(existing.identity.key()) {
            Some(candidate) => {
                let mut object = existing.clone();
                if object.apply(&candidate.description, &candidate.relationships, now) {
                    summary.updated.push(object.name().to_string());
                } else {
                    summary.unchanged += 1;
                }
                next.push(object);
            }
            None if existing.missed >= policy.tolerated_misses() => {
                summary.removed.push(existing.name().to_string());
            }
            None => {
                let mut object = existing.clone();
                object.missed += 1;
                summary.retained.push(object.name().to_string());
                next.push(object);
            }
        }
    }

    for (identity, candidate) in incoming {
        if old.contains(identity.key()) {
            continue;
        }
        summary.added.push(identity.display().to_string());
        next.push(NarrativeObject::new(
            identity,
            candidate.description.clone(),
            candidate.relationships.clone(),
            now,
        ));
    }

    Merge {
        collection: next,
        summary,
    }
}

/// Replace one object with a corrected version
///
/// The corrected object keeps the original's display position and
/// `created_at`. If the correction renames it onto another existing object,
/// that other object is removed. Returns `None` when `name` is not in the
/// collection or the replacement has a blank name.
pub fn replace_object(
    old: &ObjectCollection,
    name: &str,
    replacement: &ExtractedObject,
    now: Timestamp,
) -> Option<Merge> {
    let existing = old.get(name)?;
    let position = old.position(name)?;
    let new_identity = replacement.identity();
    if new_identity.is_empty() {
        return None;
    }

    let mut next = old.clone();
    let mut summary = MergeSummary::default();

    if new_identity == existing.identity {
        let object = next.get_mut(existing.identity.key())?;
        if object.apply(&replacement.description, &replacement.relationships, now) {
            summary.updated.push(object.name().to_string());
        } else {
            summary.unchanged += 1;
        }
    } else {
        let mut object = next.remove(existing.identity.key())?;
        let mut index = position;
        if let Some(collider_position) = next.position(new_identity.key()) {
            if let Some(collider) = next.remove(new_identity.key()) {
                summary.removed.push(collider.name().to_string());
                if collider_position < index {
                    index -= 1;
                }
            }
        }
        object.identity = new_identity;
        object.description = replacement.description.clone();
        object.relationships = replacement.relationships.clone();
        object.updated_at = now;
        object.missed = 0;
        summary.updated.push(object.name().to_string());
        next.insert_at(index, object);
    }

    Some(Merge {
        collection: next,
        summary,
    })
}

/// Candidates with a usable, unique identity, first occurrence wins
fn distinct_candidates(result: &ExtractionResult) -> Vec<(Identity, &ExtractedObject)> {
    let mut seen = HashSet::new();
    result
        .objects
        .iter()
        .filter_map(|candidate| {
            let identity = candidate.identity();
            if identity.is_empty() || !seen.insert(identity.key().to_string()) {
                return None;
            }
            Some((identity, candidate))
        })
        .collect()
}
