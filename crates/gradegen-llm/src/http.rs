//! OpenAI-compatible chat-completions provider.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::ProviderError;
use crate::provider::GenerationProvider;

/// Sends the whole prompt as a single user message and returns
/// `choices[0].message.content`.
pub struct HttpGenerationProvider {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl HttpGenerationProvider {
    pub fn new(config: GenerationConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config(
                "no API key configured (set GRADEGEN_API_KEY)".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("gradegen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create provider from environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(GenerationConfig::from_env())
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response.
fn parse_content(body: &Value) -> Result<String, ProviderError> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(
            url = %self.config.api_url,
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "sending generation request"
        );
        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json().await?;
        parse_content(&body)
    }

    fn provider_name(&self) -> &'static str {
        "openai-compatible"
    }
}
