//! Generation side of gradegen: the provider seam, retrying client,
//! placeholder fallback and the end-to-end pipeline.
//!
//! ```ignore
//! let provider = Arc::new(HttpGenerationProvider::from_env()?);
//! let client = GenerationClient::new(provider, GenerationConfig::from_env().retry_policy())?;
//! let output = GenerationPipeline::new(client).run(&rubric).await?;
//! std::fs::write(&output.file_name, &output.artifact.code)?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fakes;
pub mod http;
pub mod pipeline;
pub mod placeholder;
pub mod provider;

pub use client::{compose_prompt, extract_code, GeneratedArtifact, GenerationClient};
pub use config::{GenerationConfig, RetryPolicy};
pub use error::{GenerationError, ProviderError, Result};
pub use http::HttpGenerationProvider;
pub use pipeline::{ChunkOutcome, ChunkReport, GenerationPipeline, PipelineOutput};
pub use placeholder::placeholder_module;
pub use provider::GenerationProvider;
