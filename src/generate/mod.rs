//! Language-model clients for summarization, categorization, and answering.
//!
//! The pipeline talks to one [`GenerationClient`]; the provider behind it is a
//! configuration detail. Inputs are truncated to a bounded prefix before
//! submission because the providers have context-size limits; a deliberate,
//! lossy step, not a bug. The prompt templates in [`prompts`] are the wire
//! contract with the service and are shared by every provider.

mod ollama;
mod openai;
pub mod prompts;

use crate::config::{Config, GenerationProvider};
use async_trait::async_trait;
use thiserror::Error;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Errors surfaced by language-model calls.
///
/// All variants are per-file failures at the pipeline boundary: the document
/// is skipped and the failure is reported, never retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider endpoint was unreachable.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate text: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by language-model backends.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Summarize a document's extracted text.
    async fn summarize(&self, text: &str) -> Result<String, GenerationError>;

    /// Produce the three-line category/domain/technologies tag string.
    ///
    /// The client is responsible only for prompting the model to follow the
    /// labeled format; parsing it is the caller's concern.
    async fn categorize(&self, text: &str) -> Result<String, GenerationError>;

    /// Answer a free-text question given the retrieved summary context.
    async fn answer(&self, question: &str, context: &str) -> Result<String, GenerationError>;
}

/// Build a generation client for the configured provider.
pub fn get_generation_client(config: &Config) -> Box<dyn GenerationClient> {
    match config.generation_provider {
        GenerationProvider::OpenAI => Box::new(OpenAiClient::new(
            config
                .openai_api_key
                .clone()
                .unwrap_or_default(),
            config.generation_model.clone(),
        )),
        GenerationProvider::Ollama => Box::new(OllamaClient::new(
            config.ollama_url.clone(),
            config.generation_model.clone(),
        )),
    }
}
