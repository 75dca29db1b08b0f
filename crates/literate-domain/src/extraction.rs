//! Extraction module - what one call to the extraction service produces

use crate::identity::Identity;
use crate::object::Relationship;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One candidate object as reported by the extraction service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedObject {
    /// Raw name as reported
    pub name: String,

    /// Description, possibly empty
    #[serde(default)]
    pub description: String,

    /// Relationships, possibly dangling
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ExtractedObject {
    /// Create a candidate without relationships
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            relationships: Vec::new(),
        }
    }

    /// Add a relationship
    pub fn with_relationship(
        mut self,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.relationships.push(Relationship::new(target, description));
        self
    }

    /// The normalized identity of this candidate
    pub fn identity(&self) -> Identity {
        Identity::new(&self.name)
    }
}

/// The complete object set derived from one snapshot of the text
///
/// This is never a delta: objects missing here are treated as gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Candidates in the order the service listed them
    pub objects: Vec<ExtractedObject>,
}

impl ExtractionResult {
    /// Wrap a list of candidates
    pub fn new(objects: Vec<ExtractedObject>) -> Self {
        Self { objects }
    }

    /// A result with no objects
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if there are no candidates
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Candidate names in order
    pub fn names(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.name.as_str()).collect()
    }
}

/// Classification of a failed extraction, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Connection refused, timeout, DNS, non-2xx
    Transport,
    /// Response arrived but did not have the expected shape
    Schema,
}

impl ErrorKind {
    /// Short label for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Schema => "schema",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors an extraction client reports
///
/// Neither kind is fatal and neither is retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum ExtractionError {
    /// The service could not be reached or answered with a failure status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered, but the payload failed validation
    #[error("Schema error: {0}")]
    Schema(String),
}

impl ExtractionError {
    /// The error's classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::Transport(_) => ErrorKind::Transport,
            ExtractionError::Schema(_) => ErrorKind::Schema,
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            ExtractionError::Transport(m) | ExtractionError::Schema(m) => m,
        }
    }
}
