//! Error types for generation calls.

use thiserror::Error;

/// A single provider call failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status
    #[error("provider returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected shape
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The provider is not usable as configured
    #[error("provider configuration error: {0}")]
    Config(String),

    /// Failure injected by a scripted fake
    #[error("scripted failure: {0}")]
    Scripted(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.to_string())
    }
}

/// Generation with retry gave up.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Every attempt failed and no candidate text was retained
    #[error("generation exhausted after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("invalid generation configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
