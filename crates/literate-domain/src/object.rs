//! Narrative object module - the unit shown to the user

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Current wall-clock time as a [`Timestamp`]
///
/// A clock set before 1970 reads as zero rather than failing.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// A directed relationship from one narrative object to another
///
/// The target is stored exactly as the extraction service named it. It may
/// refer to an object that is not (yet) in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    /// Name of the related object
    pub target: String,

    /// How the two objects relate
    pub description: String,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            description: description.into(),
        }
    }
}

/// A named entity tracked across extraction calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeObject {
    /// Merge key and display name
    pub identity: Identity,

    /// Single-sentence description, possibly empty
    pub description: String,

    /// Outgoing relationships in the order the service listed them
    pub relationships: Vec<Relationship>,

    /// When the object first appeared
    pub created_at: Timestamp,

    /// When description or relationships last changed value
    pub updated_at: Timestamp,

    /// Consecutive applied results this object was absent from
    #[serde(default, skip_serializing_if = "is_zero")]
    pub missed: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl NarrativeObject {
    /// Create an object first seen at `now`
    pub fn new(
        identity: Identity,
        description: impl Into<String>,
        relationships: Vec<Relationship>,
        now: Timestamp,
    ) -> Self {
        Self {
            identity,
            description: description.into(),
            relationships,
            created_at: now,
            updated_at: now,
            missed: 0,
        }
    }

    /// The display name
    pub fn name(&self) -> &str {
        self.identity.display()
    }

    /// Replace content in place, refreshing `updated_at` only on a value change
    ///
    /// Returns true when anything changed.
    pub fn apply(
        &mut self,
        description: &str,
        relationships: &[Relationship],
        now: Timestamp,
    ) -> bool {
        self.missed = 0;
        if self.description == description && self.relationships == relationships {
            return false;
        }
        self.description = description.to_string();
        self.relationships = relationships.to_vec();
        self.updated_at = now;
        true
    }
}
