//! Provider registry: builds adapters from config and hands them out by id.

use std::collections::HashMap;
use std::sync::Arc;

use parley_config::{AppConfig, ProviderKind};
use parley_core::provider::Provider;
use tracing::{debug, warn};

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Every provider adapter the process can call, keyed by provider id.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Get a specific provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// List all registered provider ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All adapters, for handing to the router.
    pub fn into_providers(self) -> Vec<Arc<dyn Provider>> {
        self.providers.into_values().collect()
    }
}

/// Build adapters for every configured provider that has an API key.
///
/// Providers without a key are skipped: they are not "configured" as far as
/// routing is concerned.
pub fn build_from_config(config: &AppConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    for (id, provider_config) in &config.providers {
        let Some(api_key) = provider_config.api_key.clone() else {
            debug!(provider = %id, "No API key, skipping provider");
            continue;
        };

        let base_url = provider_config.api_url.clone();
        let model = provider_config.model.clone();

        let provider: Arc<dyn Provider> = match provider_config.kind_for(id) {
            ProviderKind::Anthropic => {
                let mut p = AnthropicProvider::new(api_key);
                if let Some(url) = base_url {
                    p = p.with_base_url(url);
                }
                if let Some(model) = model {
                    p = p.with_model(model);
                }
                Arc::new(p)
            }
            ProviderKind::Gemini => {
                let mut p = GeminiProvider::new(api_key);
                if let Some(url) = base_url {
                    p = p.with_base_url(url);
                }
                if let Some(model) = model {
                    p = p.with_model(model);
                }
                Arc::new(p)
            }
            ProviderKind::OpenaiCompat => {
                let Some(url) = base_url.or_else(|| default_base_url(id)) else {
                    warn!(provider = %id, "No api_url configured and no default known, skipping");
                    continue;
                };
                let model = model.unwrap_or_else(|| "gpt-4".into());
                Arc::new(OpenAiCompatProvider::new(id.clone(), url, api_key, model))
            }
        };

        registry.register(provider);
    }

    registry
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_id: &str) -> Option<String> {
    let url = match provider_id {
        "openai" => "https://api.openai.com/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "mistral" => "https://api.mistral.ai/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "ollama" => "http://localhost:11434/v1",
        _ => return None,
    };
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(config: &mut AppConfig, ids: &[&str]) {
        for id in ids {
            config.providers.get_mut(*id).unwrap().api_key = Some(format!("{id}-key"));
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(OpenAiCompatProvider::openai("sk-test")));

        assert!(registry.get("openai").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.ids(), vec!["openai"]);
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").unwrap().contains("api.openai.com"));
        assert!(default_base_url("mistral").unwrap().contains("mistral.ai"));
        assert!(default_base_url("somewhere").is_none());
    }

    #[test]
    fn unkeyed_providers_are_skipped() {
        let registry = build_from_config(&AppConfig::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn build_uses_configured_kinds_and_models() {
        let mut config = AppConfig::default();
        keyed(&mut config, &["openai", "anthropic", "gemini", "deepseek"]);

        let registry = build_from_config(&config);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("anthropic").unwrap().model(), "claude-3-opus-20240229");
        assert_eq!(registry.get("gemini").unwrap().model(), "gemini-1.5-pro");
        assert_eq!(registry.get("deepseek").unwrap().model(), "deepseek-chat");
        assert!(!registry.contains("mistral"));
    }

    #[test]
    fn unknown_compat_provider_needs_url() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "custom".into(),
            parley_config::ProviderConfig {
                api_key: Some("k".into()),
                ..Default::default()
            },
        );
        assert!(!build_from_config(&config).contains("custom"));

        config.providers.get_mut("custom").unwrap().api_url = Some("http://localhost:1234/v1".into());
        assert!(build_from_config(&config).contains("custom"));
    }
}
