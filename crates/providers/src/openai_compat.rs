//! OpenAI-compatible provider implementation.
//!
//! Works with: OpenAI, DeepSeek, Mistral, OpenRouter, and any endpoint that
//! exposes `/chat/completions` in the OpenAI shape.
//!
//! Supports:
//! - Single-turn chat completions (optional system message)
//! - JSON mode via `response_format: {"type": "json_object"}`
//! - Health checks against `/models`

use std::time::Duration;

use async_trait::async_trait;
use parley_core::error::ProviderError;
use parley_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: http::client(Duration::from_secs(120)),
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, "gpt-4")
    }

    /// Create a DeepSeek provider (convenience constructor).
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self::new(
            "deepseek",
            "https://api.deepseek.com/v1",
            api_key,
            "deepseek-chat",
        )
    }

    /// Create a Mistral provider (convenience constructor).
    pub fn mistral(api_key: impl Into<String>) -> Self {
        Self::new(
            "mistral",
            "https://api.mistral.ai/v1",
            api_key,
            "mistral-large-latest",
        )
    }

    fn to_api_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ApiMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.push(ApiMessage {
            role: "user".into(),
            content: request.prompt.clone(),
        });
        messages
    }

    fn build_body(&self, request: &CompletionRequest, json_mode: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(request),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        body
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        json_mode: bool,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(request, json_mode);

        debug!(provider = %self.name, model = %self.model, json_mode, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(&self.name, response).await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Self::into_completion(api_response)
    }

    fn into_completion(
        api_response: ApiResponse,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            model: api_response.model,
        })
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        self.send(&request, false).await
    }

    async fn complete_json(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<serde_json::Value, ProviderError> {
        let response = self.send(&request, true).await?;
        parse_json_object(&response.text)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(http::transport_error)?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_constructor() {
        let provider = OpenAiCompatProvider::openai("sk-test");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4");
        assert!(provider.base_url.contains("api.openai.com"));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let provider = OpenAiCompatProvider::new("x", "http://localhost:8000/v1/", "k", "m");
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn system_message_comes_first() {
        let req = CompletionRequest::new("Hello").with_system("Be brief");
        let messages = OpenAiCompatProvider::to_api_messages(&req);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "Hello");
    }

    #[test]
    fn json_mode_sets_response_format() {
        let provider = OpenAiCompatProvider::deepseek("sk-test");
        let req = CompletionRequest::new("hi").with_max_tokens(64);

        let body = provider.build_body(&req, true);
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["response_format"]["type"], "json_object");

        let body = provider.build_body(&req, false);
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn parse_chat_response() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{"model": "gpt-4-0613", "choices": [{"message": {"role": "assistant", "content": "Olá!"}}]}"#,
        )
        .unwrap();
        let completion = OpenAiCompatProvider::into_completion(resp).unwrap();
        assert_eq!(completion.text, "Olá!");
        assert_eq!(completion.model, "gpt-4-0613");
    }

    #[test]
    fn empty_choices_is_invalid() {
        let resp: ApiResponse = serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        let err = OpenAiCompatProvider::into_completion(resp).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
