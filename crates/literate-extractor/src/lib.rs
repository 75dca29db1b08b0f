//! Literate Extractor
//!
//! Converts a full text snapshot into narrative objects using an LLM.
//!
//! # Overview
//!
//! The Extractor is the production implementation of
//! [`literate_domain::ExtractionClient`]. Each call sends the whole text,
//! validates the structured answer and returns the complete object set.
//! It never merges and keeps no state between calls.
//!
//! # Architecture
//!
//! ```text
//! Text → PromptBuilder → LlmProvider → parser → ExtractionResult
//! ```
//!
//! # Key Features
//!
//! - **Strict validation**: one malformed object rejects the response
//! - **Error taxonomy**: failures collapse to transport or schema errors
//! - **Bounded calls**: each call runs under a timeout
//! - **Corrections**: re-derive a single object by name
//!
//! # Example Usage
//!
//! ```no_run
//! use literate_extractor::{Extractor, ExtractorConfig};
//! use literate_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"objects": [{"name": "Alice", "description": "A girl"}]}"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//!
//! let result = extractor.extract_objects("Alice went home.").await?;
//! println!("Found: {:?}", result.names());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::{
    parse_llm_response, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
    MAX_RELATIONSHIP_DESCRIPTION_LENGTH,
};
pub use prompt::PromptBuilder;
