//! Identity module - the merge key of a narrative object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Normalized name of a narrative object
///
/// Two identities are equal when their trimmed, case-folded forms match.
/// The trimmed original spelling is kept for display.
///
/// # Examples
///
/// ```
/// use literate_domain::Identity;
///
/// let first = Identity::new("  Bob ");
/// let later = Identity::new("BOB");
///
/// assert_eq!(first, later);
/// assert_eq!(first.display(), "Bob");
/// assert_eq!(first.key(), "bob");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Identity {
    display: String,
    key: String,
}

impl Identity {
    /// Create an identity from a raw name
    pub fn new(name: impl AsRef<str>) -> Self {
        let display = name.as_ref().trim().to_string();
        let key = normalize(&display);
        Self { display, key }
    }

    /// The spelling shown to the user
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The comparison key (trimmed and case folded)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the name is blank after trimming
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Normalize a raw name into its comparison key
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.display
    }
}
