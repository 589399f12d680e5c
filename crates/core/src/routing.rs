//! Routing value types shared by the router, the memory manager and callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider id used on responses that no provider produced.
pub const SYSTEM_PROVIDER: &str = "system";

/// The classifier's verdict on a query, driving provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Simple,
    Complex,
    Analytical,
    Creative,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Simple,
        Category::Complex,
        Category::Analytical,
        Category::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Simple => "simple",
            Category::Complex => "complex",
            Category::Analytical => "analytical",
            Category::Creative => "creative",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The strength a configured provider is picked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    /// General-purpose default
    General,
    /// Analysis and explanation
    Analytic,
    /// Creative generation
    Generative,
    /// Math, code and multi-step reasoning
    Reasoning,
}

impl std::fmt::Display for ProviderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderRole::General => "general",
            ProviderRole::Analytic => "analytic",
            ProviderRole::Generative => "generative",
            ProviderRole::Reasoning => "reasoning",
        };
        f.write_str(s)
    }
}

/// Live availability of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub provider_id: String,
    pub available: bool,
    pub last_checked: DateTime<Utc>,
}

/// Why a provider was chosen for a request, and what happens if it fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub category: Category,
    pub selected_provider: String,
    /// Providers attempted, in order, after the selected one fails.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_chain: Vec<String>,
    pub reason: String,
}

/// Estimated token usage of one invocation.
///
/// These are **not** provider-reported figures: both sides are approximated
/// as character count divided by a fixed chars-per-token constant. Use them
/// for rough accounting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEstimate {
    pub input: usize,
    pub output: usize,
    pub total: usize,
}

impl TokenEstimate {
    /// Estimate from the prompt, optional system instruction and output text.
    pub fn from_texts(
        prompt: &str,
        system: Option<&str>,
        output: &str,
        chars_per_token: usize,
    ) -> Self {
        let input = estimate_tokens(prompt, chars_per_token)
            + system.map_or(0, |s| estimate_tokens(s, chars_per_token));
        let output = estimate_tokens(output, chars_per_token);
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// Coarse token estimate: characters / `chars_per_token`.
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    text.chars().count() / chars_per_token.max(1)
}

/// The router's answer to a single `route` call.
///
/// Always produced, even on failure: a failed route carries `error` and a
/// human-readable `text` so transports can render it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: String,
    pub provider_id: String,
    pub model_id: String,
    pub category: Category,
    pub token_estimate: TokenEstimate,
    pub timestamp: DateTime<Utc>,

    /// Set when no provider produced an answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The decision that produced this response (absent for tool answers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<RoutingDecision>,

    /// The provider that failed before the fallback answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<String>,
}

impl ModelResponse {
    /// A structured failure response.
    pub fn failure(category: Category, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            text: format!("Sorry, I could not generate a response right now: {error}"),
            provider_id: SYSTEM_PROVIDER.into(),
            model_id: "error".into(),
            category,
            token_estimate: TokenEstimate::default(),
            timestamp: Utc::now(),
            error: Some(error),
            decision: None,
            fallback_from: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Metadata stored alongside the agent message in conversation memory.
    pub fn essential_metadata(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut meta = serde_json::Map::new();
        meta.insert("source".into(), "router".into());
        meta.insert("provider".into(), self.provider_id.clone().into());
        meta.insert("model".into(), self.model_id.clone().into());
        meta.insert("category".into(), self.category.as_str().into());
        meta.insert("input_tokens".into(), self.token_estimate.input.into());
        meta.insert("output_tokens".into(), self.token_estimate.output.into());
        meta.insert("total_tokens".into(), self.token_estimate.total.into());
        if let Some(ref from) = self.fallback_from {
            meta.insert("fallback_from".into(), from.clone().into());
        }
        if let Some(ref err) = self.error {
            meta.insert("error".into(), err.clone().into());
        }
        meta
    }
}
