//! Generation client: one provider call per attempt, bounded retries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gradegen_core::script::is_registration_start;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RetryPolicy;
use crate::error::{GenerationError, ProviderError, Result};
use crate::provider::GenerationProvider;

const FENCE: &str = "```";

/// Code returned by [`GenerationClient::generate_with_retry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub code: String,
    /// Attempts used, including the successful one.
    pub attempts: u32,
    /// `false` when retries ran out and this is the last candidate that
    /// came back without a test registration.
    pub validated: bool,
    pub generated_at: DateTime<Utc>,
}

pub struct GenerationClient {
    provider: Arc<dyn GenerationProvider>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn GenerationProvider>, policy: RetryPolicy) -> Result<Self> {
        if policy.max_retries == 0 {
            return Err(GenerationError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(Self { provider, policy })
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// One provider call. Returns the extracted code, possibly empty.
    pub async fn generate(
        &self,
        system: &str,
        rubric: &str,
        example: &str,
    ) -> std::result::Result<String, ProviderError> {
        let prompt = compose_prompt(system, rubric, example);
        let response = self.provider.complete(&prompt).await?;
        Ok(extract_code(&response))
    }

    /// `true` when some line starts a named test registration.
    pub fn validate(code: &str) -> bool {
        code.lines().any(is_registration_start)
    }

    /// Call [`generate`](Self::generate) up to `max_retries` times.
    ///
    /// Provider errors sleep `backoff_base_ms * attempt` before the next
    /// attempt. A non-empty candidate without a test registration is kept
    /// and returned unvalidated if no later attempt does better.
    pub async fn generate_with_retry(
        &self,
        system: &str,
        rubric: &str,
        example: &str,
    ) -> Result<GeneratedArtifact> {
        let max = self.policy.max_retries;
        let mut retained: Option<String> = None;
        let mut last_error = String::from("no output");

        for attempt in 1..=max {
            match self.generate(system, rubric, example).await {
                Ok(code) if code.trim().is_empty() => {
                    warn!(attempt, provider = self.provider_name(), "generator returned no code");
                    last_error = "empty response".to_string();
                }
                Ok(code) if Self::validate(&code) => {
                    info!(attempt, chars = code.len(), "generated candidate accepted");
                    return Ok(GeneratedArtifact {
                        code,
                        attempts: attempt,
                        validated: true,
                        generated_at: Utc::now(),
                    });
                }
                Ok(code) => {
                    warn!(attempt, "candidate has no test registration, retaining it");
                    last_error = "candidate has no test registration".to_string();
                    retained = Some(code);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "generation call failed");
                    last_error = err.to_string();
                    if attempt < max {
                        let delay = self.policy.backoff_for(attempt);
                        debug!(delay_ms = delay.as_millis() as u64, "backing off");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        match retained {
            Some(code) => Ok(GeneratedArtifact {
                code,
                attempts: max,
                validated: false,
                generated_at: Utc::now(),
            }),
            None => Err(GenerationError::Exhausted {
                attempts: max,
                last_error,
            }),
        }
    }
}

/// The three prompt blobs as one prompt.
pub fn compose_prompt(system: &str, rubric: &str, example: &str) -> String {
    format!("{}\n\n{}\n\n{}", system.trim_end(), rubric.trim_end(), example.trim_end())
}

/// Body of the first fenced block, or the whole trimmed text when there is
/// none. An unterminated fence runs to the end of the text.
pub fn extract_code(response: &str) -> String {
    let Some(open) = response.find(FENCE) else {
        return response.trim().to_string();
    };
    let after = &response[open + FENCE.len()..];
    // Skip the info string (`javascript`, `js`, ...).
    let body = after.find('\n').map_or("", |nl| &after[nl + 1..]);
    let code = body.find(FENCE).map_or(body, |close| &body[..close]);
    code.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_fenced_block() {
        let text = "Here you go:\n```javascript\ntest('a', () => {});\n```\nand\n```js\nother\n```";
        assert_eq!(extract_code(text), "test('a', () => {});");
    }

    #[test]
    fn test_extract_unterminated_fence_takes_rest() {
        let text = "```js\ntest('a', async () => {\n  try {";
        assert_eq!(extract_code(text), "test('a', async () => {\n  try {");
    }

    #[test]
    fn test_extract_without_fence_trims() {
        assert_eq!(extract_code("  test('a', () => {});\n\n"), "test('a', () => {});");
    }

    #[test]
    fn test_validate_requires_named_registration() {
        assert!(GenerationClient::validate("  test(\"x\", async () => {});"));
        assert!(GenerationClient::validate("test(`x`, async () => {});"));
        assert!(!GenerationClient::validate("test.afterAll(async () => {});"));
        assert!(!GenerationClient::validate("// test('commented')"));
    }

    #[test]
    fn test_compose_prompt_keeps_order() {
        let prompt = compose_prompt("SYS\n", "RUBRIC", "EXAMPLE");
        assert_eq!(prompt, "SYS\n\nRUBRIC\n\nEXAMPLE");
    }
}
