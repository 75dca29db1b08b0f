//! Literate Domain Layer
//!
//! This crate contains the narrative model and the reconciliation rules that
//! keep it stable across repeated, independent extraction calls.
//!
//! ## Key Concepts
//!
//! - **Identity**: The normalized name of a narrative object, used as merge key
//! - **Narrative Object**: A named entity with a description and relationships
//! - **Object Collection**: The persistent, display-ordered set of objects
//! - **Extraction Result**: One complete re-derivation of the object set
//! - **Reconciliation**: The pure merge of a result into a collection
//!
//! ## Architecture
//!
//! This crate holds no I/O. Extraction backends implement the
//! [`ExtractionClient`](traits::ExtractionClient) trait in other crates, and the
//! scheduler drives [`reconcile`] from its owner task.
//!
//! ```
//! use literate_domain::{reconcile, ExtractedObject, ExtractionResult, ObjectCollection};
//!
//! let result = ExtractionResult::new(vec![
//!     ExtractedObject::new("Alice", "A traveller."),
//!     ExtractedObject::new("Bob", "Alice's friend."),
//! ]);
//!
//! let merge = reconcile(&ObjectCollection::new(), &result, 1_000);
//! assert_eq!(merge.collection.names(), vec!["Alice", "Bob"]);
//! assert_eq!(merge.summary.added.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod extraction;
pub mod identity;
pub mod object;
pub mod reconcile;
pub mod traits;

// Re-exports for convenience
pub use collection::{CollectionStats, ObjectCollection};
pub use extraction::{ErrorKind, ExtractedObject, ExtractionError, ExtractionResult};
pub use identity::Identity;
pub use object::{now_millis, NarrativeObject, Relationship, Timestamp};
pub use reconcile::{reconcile, reconcile_with, replace_object, DeletionPolicy, Merge, MergeSummary};
pub use traits::ExtractionClient;
