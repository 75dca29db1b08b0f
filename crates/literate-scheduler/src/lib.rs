//! Literate Scheduler
//!
//! Debounced, sequence-filtered extraction driving a live object collection.
//!
//! # Overview
//!
//! The scheduler sits between an editor and an [`ExtractionClient`]:
//! - **Debouncing**: every edit restarts a quiet-period timer; a burst of
//!   edits produces one request carrying the final text
//! - **Staleness filtering**: each request gets a sequence number and only
//!   the completion for the newest request is merged
//! - **Reconciliation**: accepted results are merged with
//!   [`literate_domain::reconcile_with`], so existing objects keep their
//!   position and creation time
//! - **Reporting**: readers watch [`CollectionSnapshot`]s and receive
//!   [`SchedulerEvent`]s, including tagged errors
//!
//! # Concurrency
//!
//! A single owner task holds the collection, the timer and the counters.
//! Extraction calls run as separate tasks and send their completions back to
//! the owner over a channel. In-flight calls are never aborted; a newer
//! request simply makes them irrelevant.
//!
//! # Configuration
//!
//! ```toml
//! [scheduler]
//! debounce_ms = 2500
//! deletion_policy = { mode = "immediate" }
//! ```
//!
//! [`ExtractionClient`]: literate_domain::ExtractionClient

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod scheduler;
mod state;

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use metrics::SchedulerMetrics;
pub use scheduler::{Clock, Scheduler, SchedulerHandle};
pub use state::{CollectionSnapshot, RequestState, SchedulerEvent};
