//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use async_trait::async_trait;
use literate_domain::{ExtractedObject, ExtractionClient, ExtractionError, ExtractionResult};
use literate_llm::LlmProvider;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns a text snapshot into narrative objects
///
/// Stateless between calls: every call sends the full text and returns the
/// full object set.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self::from_arc(Arc::new(llm_provider), config)
    }

    /// Create a new Extractor sharing an existing provider
    pub fn from_arc(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Derive the complete object set for `text`
    ///
    /// Blank text yields an empty result without calling the provider.
    pub async fn extract_objects(&self, text: &str) -> Result<ExtractionResult, ExtractorError> {
        if text.trim().is_empty() {
            debug!("Blank text, skipping extraction call");
            return Ok(ExtractionResult::empty());
        }

        let text = self.prepare_text(text);
        let prompt = PromptBuilder::new(&text).extraction();
        debug!("Prompt length: {} chars", prompt.len());

        let response = self.call_llm(&prompt).await?;
        debug!("LLM response length: {} chars", response.len());

        let objects = parse_llm_response(&response)?;
        info!("Extracted {} objects", objects.len());

        Ok(ExtractionResult::new(objects))
    }

    /// Re-derive the single object named `name` against `text`
    ///
    /// Returns `None` for blank text or when the model offers no object.
    pub async fn correct_object(
        &self,
        name: &str,
        text: &str,
    ) -> Result<Option<ExtractedObject>, ExtractorError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let text = self.prepare_text(text);
        let prompt = PromptBuilder::new(&text).correction(name);

        let response = self.call_llm(&prompt).await?;
        let mut objects = parse_llm_response(&response)?;

        if objects.len() > 1 {
            warn!(
                "Correction for '{}' returned {} objects, keeping the first",
                name,
                objects.len()
            );
        }
        let corrected = if objects.is_empty() {
            None
        } else {
            Some(objects.swap_remove(0))
        };

        info!(
            "Correction for '{}': {}",
            name,
            corrected.as_ref().map(|o| o.name.as_str()).unwrap_or("<none>")
        );
        Ok(corrected)
    }

    /// Truncate over-long input on a character boundary
    fn prepare_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let max = self.config.max_text_length;
        match text.char_indices().nth(max) {
            Some((cut, _)) => {
                warn!(
                    "Text exceeds {} chars, truncating before extraction",
                    max
                );
                Cow::Owned(format!("{}...", &text[..cut]))
            }
            None => Cow::Borrowed(text),
        }
    }

    /// Call the LLM provider under the configured timeout
    async fn call_llm(&self, prompt: &str) -> Result<String, ExtractorError> {
        let limit = self.config.timeout();
        timeout(limit, self.llm_provider.generate(prompt))
            .await
            .map_err(|_| ExtractorError::Timeout(limit))?
            .map_err(ExtractorError::from)
    }
}

#[async_trait]
impl<L> ExtractionClient for Extractor<L>
where
    L: LlmProvider,
{
    async fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractionError> {
        self.extract_objects(text).await.map_err(|e| {
            warn!("Extraction failed: {}", e);
            ExtractionError::from(e)
        })
    }

    async fn correct(
        &self,
        name: &str,
        text: &str,
    ) -> Result<Option<ExtractedObject>, ExtractionError> {
        self.correct_object(name, text).await.map_err(|e| {
            warn!("Correction failed: {}", e);
            ExtractionError::from(e)
        })
    }

    async fn is_available(&self) -> bool {
        self.llm_provider.is_available().await
    }
}
