//! Error types for the Extractor

use literate_domain::ExtractionError;
use literate_llm::LlmError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Extraction timeout
    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    /// Response is JSON but does not have the expected shape
    #[error("Invalid object format: {0}")]
    InvalidFormat(String),

    /// Response is not JSON at all
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<ExtractorError> for ExtractionError {
    /// Collapse onto the two kinds the scheduler reports
    ///
    /// A provider envelope that could not be decoded is a schema problem;
    /// every other provider failure is a transport problem.
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::Llm(LlmError::InvalidResponse(msg)) => ExtractionError::Schema(msg),
            ExtractorError::Llm(other) => ExtractionError::Transport(other.to_string()),
            ExtractorError::Timeout(_) | ExtractorError::Config(_) => {
                ExtractionError::Transport(e.to_string())
            }
            ExtractorError::InvalidFormat(msg) | ExtractorError::JsonParse(msg) => {
                ExtractionError::Schema(msg)
            }
        }
    }
}
