//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::extraction::{ExtractedObject, ExtractionError, ExtractionResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for turning a text snapshot into narrative objects
///
/// Implemented by the application layer (literate-extractor). Each call is
/// independent: implementations hold no state between calls and never merge.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Derive the complete object set for `text`
    async fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractionError>;

    /// Re-derive a single object named `name` against `text`
    ///
    /// Returns `Ok(None)` when the service has nothing to offer.
    async fn correct(
        &self,
        name: &str,
        text: &str,
    ) -> Result<Option<ExtractedObject>, ExtractionError>;

    /// Check whether the backing service is reachable
    async fn is_available(&self) -> bool;
}

#[async_trait]
impl<T: ExtractionClient + ?Sized> ExtractionClient for Arc<T> {
    async fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractionError> {
        (**self).extract(text).await
    }

    async fn correct(
        &self,
        name: &str,
        text: &str,
    ) -> Result<Option<ExtractedObject>, ExtractionError> {
        (**self).correct(name, text).await
    }

    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }
}
