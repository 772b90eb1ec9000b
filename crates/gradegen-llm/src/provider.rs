//! The seam between the pipeline and whatever produces code.

use async_trait::async_trait;

use crate::error::ProviderError;

/// One text-in, text-out completion call.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Complete `prompt`, returning the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Short stable name used in logs.
    fn provider_name(&self) -> &'static str;
}
