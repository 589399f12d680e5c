//! Provider trait: the abstraction over external language-model services.
//!
//! A Provider issues a single-turn completion: one prompt, an optional
//! system instruction, one answer. Some providers also support a
//! JSON-structured mode that returns a parsed object instead of text.
//!
//! Implementations: OpenAI-compatible (OpenAI, DeepSeek, Mistral, ...),
//! Anthropic, Gemini.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A single-turn completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The user prompt (context already folded in by the caller)
    pub prompt: String,

    /// Optional system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,

    /// Which model actually responded (may differ from the configured one)
    pub model: String,
}

/// The core Provider trait.
///
/// The router calls `complete()` without knowing which service is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The provider id this adapter is registered under (e.g. "openai").
    fn name(&self) -> &str;

    /// The model this adapter requests by default.
    fn model(&self) -> &str;

    /// Send a request and get a complete text response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Send a request in JSON mode and get the parsed object back.
    ///
    /// Default implementation reports the mode as unsupported.
    async fn complete_json(
        &self,
        _request: CompletionRequest,
    ) -> std::result::Result<serde_json::Value, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            operation: "structured completion".into(),
        })
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Parse a JSON object out of model text, tolerating code fences and prose
/// around the object.
pub fn parse_json_object(text: &str) -> std::result::Result<serde_json::Value, ProviderError> {
    let trimmed = text.trim();
    if let Ok(value @ serde_json::Value::Object(_)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => serde_json::from_str::<serde_json::Value>(&trimmed[s..=e])
            .ok()
            .filter(|v| v.is_object())
            .ok_or_else(|| ProviderError::InvalidResponse("response is not a JSON object".into())),
        _ => Err(ProviderError::InvalidResponse(
            "no JSON object found in response".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse {
                text: request.prompt,
                model: "echo-1".into(),
            })
        }
    }

    #[test]
    fn completion_request_defaults() {
        let req = CompletionRequest::new("hi");
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.system.is_none());
        assert!(req.max_tokens.is_none());
    }

    #[tokio::test]
    async fn structured_mode_unsupported_by_default() {
        let err = EchoProvider
            .complete_json(CompletionRequest::new("{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported { .. }));
        assert!(EchoProvider.health_check().await.unwrap());
    }

    #[test]
    fn parses_plain_object() {
        let v = parse_json_object(r#"{"topic": "rust"}"#).unwrap();
        assert_eq!(v["topic"], "rust");
    }

    #[test]
    fn parses_fenced_object() {
        let v = parse_json_object("```json\n{\"summary\": \"ok\"}\n```").unwrap();
        assert_eq!(v["summary"], "ok");
    }

    #[test]
    fn rejects_non_object() {
        assert!(parse_json_object("[1, 2, 3]").is_err());
        assert!(parse_json_object("no json here").is_err());
    }
}
