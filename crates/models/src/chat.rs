//! OpenAI-compatible chat completions provider

use crate::error::ModelError;
use crate::provider::GenerationProvider;
use crate::usage::UsageMeter;
use async_trait::async_trait;
use ragas_core::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Near-zero temperature keeps question generation reproducible
const TEMPERATURE: f32 = 1e-8;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Chat completions provider for any OpenAI-compatible server
pub struct ChatCompletionProvider {
    client: Client,
    model: String,
    api_base_url: String,
    api_key: Option<String>,
    usage: Arc<UsageMeter>,
}

impl ChatCompletionProvider {
    /// Create a new chat completions provider
    ///
    /// # Arguments
    /// * `model` - Model name (e.g., "gpt-4o-mini")
    /// * `api_base_url` - Base URL ending before `/chat/completions`
    /// * `api_key` - Optional bearer token
    /// * `timeout_secs` - Request timeout in seconds
    /// * `usage` - Meter receiving prompt and completion token counts
    pub fn new(
        model: String,
        api_base_url: String,
        api_key: Option<String>,
        timeout_secs: u64,
        usage: Arc<UsageMeter>,
    ) -> Result<Self> {
        info!("Initializing chat completions provider");
        info!("  Model: {model}");
        info!("  API Base URL: {api_base_url}");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            usage,
        })
    }
}

fn first_message_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            Error::from(ModelError::InvalidResponse(
                "Chat API returned no message content".to_string(),
            ))
        })
}

#[async_trait]
impl GenerationProvider for ChatCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            n: 1,
        };

        let url = format!("{}/chat/completions", self.api_base_url);
        debug!("Sending chat completion request ({} prompt chars)", prompt.len());

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ModelError::InferenceError(format!("Chat API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ModelError::InferenceError(format!(
                "Chat API returned error {status}: {error_text}"
            ))
            .into());
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ModelError::InvalidResponse(format!("Failed to parse chat response: {e}"))
        })?;

        if let Some(ref usage) = chat_response.usage {
            self.usage
                .record(usage.prompt_tokens, usage.completion_tokens);
        }

        first_message_content(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: TEMPERATURE,
            n: 1,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_first_message_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "Paris"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}}"#,
        )
        .unwrap();
        assert_eq!(first_message_content(response).unwrap(), "Paris");
    }

    #[test]
    fn test_missing_content_is_invalid_response() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant"}}]}"#).unwrap();
        let err = first_message_content(response).unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }
}
