//! OpenAI chat-completions generation client.

use super::{GenerationClient, GenerationError, prompts};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_API_URL: &str = "https://api.openai.com";
/// Token cap applied to answer generation; summaries and tags are uncapped.
const ANSWER_MAX_TOKENS: u32 = 300;

/// Generation client backed by the OpenAI chat-completions API.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Construct a client for the hosted OpenAI endpoint.
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(DEFAULT_API_URL.to_string(), api_key, model)
    }

    /// Construct a client against an explicit base URL (used by tests).
    pub fn with_base_url(base_url: String, api_key: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("casestack/generation")
            .build()
            .expect("Failed to construct reqwest::Client for generation");
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Answers are sampled at temperature 0 under a token cap; summaries and
    /// tags run with the provider's default sampling.
    fn request_payload(&self, messages: Vec<Value>, answer_cap: Option<u32>) -> Value {
        let mut payload = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(cap) = answer_cap {
            payload["max_tokens"] = json!(cap);
            payload["temperature"] = json!(0);
        }
        payload
    }

    async fn chat(&self, messages: Vec<Value>, answer_cap: Option<u32>) -> Result<String, GenerationError> {
        let payload = self.request_payload(messages, answer_cap);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationError::ProviderUnavailable(format!(
                    "failed to reach OpenAI at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::GenerationFailed(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode OpenAI response: {error}"))
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| {
                GenerationError::InvalidResponse("OpenAI response contained no choices".into())
            })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn summarize(&self, text: &str) -> Result<String, GenerationError> {
        let messages = vec![json!({ "role": "user", "content": prompts::summarize_prompt(text) })];
        self.chat(messages, None).await
    }

    async fn categorize(&self, text: &str) -> Result<String, GenerationError> {
        let messages = vec![json!({ "role": "user", "content": prompts::categorize_prompt(text) })];
        self.chat(messages, None).await
    }

    async fn answer(&self, question: &str, context: &str) -> Result<String, GenerationError> {
        let messages = vec![
            json!({ "role": "system", "content": prompts::ANSWER_SYSTEM_PROMPT }),
            json!({ "role": "user", "content": prompts::answer_context_prompt(context) }),
            json!({ "role": "user", "content": prompts::answer_question_prompt(question) }),
        ];
        self.chat(messages, Some(ANSWER_MAX_TOKENS)).await
    }
}
