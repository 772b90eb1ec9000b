//! In-memory provider fakes (testing only).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::GenerationProvider;

/// Replays a scripted sequence of responses and records every prompt.
///
/// Once the script runs out, every call fails with
/// [`ProviderError::Scripted`].
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that answers with each response in turn.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for response in responses {
            provider.push_ok(response);
        }
        provider
    }

    pub fn push_ok(&self, response: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(response.into()));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(ProviderError::Scripted(message.into())));
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Scripted entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Scripted("script exhausted".to_string())))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_fails() {
        let provider = ScriptedProvider::with_responses(["one"]);
        provider.push_err("boom");

        assert_eq!(provider.complete("a").await.unwrap(), "one");
        assert!(matches!(
            provider.complete("b").await,
            Err(ProviderError::Scripted(msg)) if msg == "boom"
        ));
        assert!(provider.complete("c").await.is_err());
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
        assert_eq!(provider.remaining(), 0);
    }
}
