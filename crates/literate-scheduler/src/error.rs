//! Error types for scheduler operations

use thiserror::Error;

/// Errors that can occur while driving the scheduler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// The owner task has stopped and no longer accepts commands
    #[error("Scheduler stopped")]
    Stopped,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Owner task panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),
}
