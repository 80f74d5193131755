//! Ollama-backed generation client for fully local deployments.

use super::{GenerationClient, GenerationError, prompts};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Generation client issuing `/api/generate` requests to a local Ollama runtime.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Construct a client, falling back to the default local endpoint.
    pub fn new(base_url: Option<String>, model: String) -> Self {
        let http = Client::builder()
            .user_agent("casestack/generation")
            .build()
            .expect("Failed to construct reqwest::Client for generation");
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    async fn generate(&self, prompt: String) -> Result<String, GenerationError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                // Lower temperature for reproducible summaries and tags.
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(GenerationError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn summarize(&self, text: &str) -> Result<String, GenerationError> {
        self.generate(prompts::summarize_prompt(text)).await
    }

    async fn categorize(&self, text: &str) -> Result<String, GenerationError> {
        self.generate(prompts::categorize_prompt(text)).await
    }

    async fn answer(&self, question: &str, context: &str) -> Result<String, GenerationError> {
        // Ollama's generate endpoint takes a single prompt, so the chat turns
        // are concatenated in role order.
        let prompt = format!(
            "{}{}\n\n{}",
            prompts::ANSWER_SYSTEM_PROMPT,
            prompts::answer_context_prompt(context),
            prompts::answer_question_prompt(question)
        );
        self.generate(prompt).await
    }
}
