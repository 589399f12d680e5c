//! Router: the single entry point that turns a prompt into a [`ModelResponse`].
//!
//! Per `route` call: probe stale providers, classify the raw prompt, select
//! from the available set, invoke with a deadline. On failure the provider
//! is marked unavailable; only the analytic-role provider gets one automatic
//! fallback to the general-role provider. Failures never escape as errors:
//! the caller always receives a `ModelResponse`, flagged via `error`.
//!
//! The fallback sequence is strictly sequential; providers are never raced.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parley_config::RoutingConfig;
use parley_core::error::ProviderError;
use parley_core::provider::{CompletionRequest, CompletionResponse, Provider};
use parley_core::{
    Category, ModelResponse, ProviderRole, ProviderStatus, RelevantContext, RoutingDecision,
    TokenEstimate, SYSTEM_PROVIDER,
};
use tracing::{debug, info, warn};

use crate::availability::AvailabilityRegistry;
use crate::classifier::{Classifier, KeywordClassifier};
use crate::selector::ModelSelector;

const TOOL_SYSTEM_PROMPT: &str = "You are an assistant that uses tool results to write complete, \
informative answers. Based on the user's original message and the tool output, give a clear answer \
that integrates the information from the tool naturally.";

/// Numeric knobs of the router.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub health_check_interval: chrono::Duration,
    pub call_timeout: Duration,
    pub chars_per_token: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Most recent window messages folded into the prompt context
    pub context_messages: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self::from_config(&RoutingConfig::default())
    }
}

impl RouterSettings {
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            health_check_interval: i64::try_from(config.health_check_interval_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            chars_per_token: config.chars_per_token,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            context_messages: 10,
        }
    }
}

/// Which provider a structured (JSON) invocation goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredTarget {
    Analytic,
    General,
}

impl StructuredTarget {
    fn role(self) -> ProviderRole {
        match self {
            StructuredTarget::Analytic => ProviderRole::Analytic,
            StructuredTarget::General => ProviderRole::General,
        }
    }
}

pub struct Router {
    providers: HashMap<String, Arc<dyn Provider>>,
    registry: AvailabilityRegistry,
    selector: ModelSelector,
    classifier: Arc<dyn Classifier>,
    settings: RouterSettings,
}

impl Router {
    /// Build a router over the given adapters with the keyword classifier.
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        selector: ModelSelector,
        settings: RouterSettings,
    ) -> Self {
        let providers: HashMap<String, Arc<dyn Provider>> = providers
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();
        let registry = AvailabilityRegistry::new(providers.keys().cloned());

        Self {
            providers,
            registry,
            selector,
            classifier: Arc::new(KeywordClassifier::default()),
            settings,
        }
    }

    /// Build a router from the routing section of the configuration.
    pub fn from_config(providers: Vec<Arc<dyn Provider>>, config: &RoutingConfig) -> Self {
        Self::new(
            providers,
            ModelSelector::from_config(config),
            RouterSettings::from_config(config),
        )
    }

    /// Swap the classification strategy.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classify(&self, prompt: &str) -> Category {
        self.classifier.classify(prompt)
    }

    pub fn registry(&self) -> &AvailabilityRegistry {
        &self.registry
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Configured provider ids, sorted.
    pub fn configured(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Snapshot of every provider's availability.
    pub async fn status(&self) -> Vec<ProviderStatus> {
        self.registry.snapshot().await
    }

    /// Probe every provider whose last check is older than the interval.
    pub async fn probe_stale(&self) {
        let stale = self.registry.stale(self.settings.health_check_interval).await;
        self.probe(&stale).await;
    }

    /// Probe every configured provider now.
    pub async fn probe_all(&self) {
        self.probe(&self.configured()).await;
    }

    async fn probe(&self, ids: &[String]) {
        let probes = ids.iter().filter_map(|id| {
            let provider = self.providers.get(id)?.clone();
            let deadline = self.settings.call_timeout;
            Some(async move {
                let healthy = matches!(
                    tokio::time::timeout(deadline, provider.health_check()).await,
                    Ok(Ok(true))
                );
                (provider.name().to_string(), healthy)
            })
        });

        for (id, healthy) in join_all(probes).await {
            if !healthy {
                warn!(provider = %id, "Health probe failed");
            }
            self.registry.mark(&id, healthy).await;
        }
    }

    /// Available ∩ configured.
    async fn available(&self) -> BTreeSet<String> {
        self.registry
            .list_available()
            .await
            .into_iter()
            .filter(|id| self.providers.contains_key(id))
            .collect()
    }

    /// Classify and select without invoking anything.
    pub async fn decide(
        &self,
        prompt: &str,
    ) -> Result<RoutingDecision, parley_core::error::RoutingError> {
        let category = self.classify(prompt);
        let available = self.available().await;
        let selection = self.selector.select(category, &available)?;

        let analytic = self.selector.provider_for(ProviderRole::Analytic);
        let general = self.selector.provider_for(ProviderRole::General);
        let fallback_chain = if selection.provider_id == analytic
            && general != analytic
            && self.providers.contains_key(general)
        {
            vec![general.to_string()]
        } else {
            Vec::new()
        };

        Ok(RoutingDecision {
            category,
            selected_provider: selection.provider_id,
            fallback_chain,
            reason: selection.reason,
        })
    }

    /// Route a prompt to the best available provider.
    ///
    /// `context`, when present and non-empty, is rendered in front of the
    /// prompt; classification always sees the raw prompt.
    pub async fn route(
        &self,
        prompt: &str,
        system: Option<&str>,
        context: Option<&RelevantContext>,
    ) -> ModelResponse {
        self.probe_stale().await;

        let decision = match self.decide(prompt).await {
            Ok(d) => d,
            Err(e) => {
                let category = self.classify(prompt);
                warn!(category = %category, error = %e, "No provider available");
                return ModelResponse::failure(category, e.to_string());
            }
        };

        info!(
            category = %decision.category,
            provider = %decision.selected_provider,
            fallback = ?decision.fallback_chain,
            "Routing decision"
        );

        let full_prompt = match context.map(|c| c.render(self.settings.context_messages)) {
            Some(rendered) if !rendered.is_empty() => {
                format!("Context: {rendered}\n\nQuestion: {prompt}")
            }
            _ => prompt.to_string(),
        };
        let request = self.request(&full_prompt, system);

        let mut last_error = match self.call(&decision.selected_provider, request.clone()).await {
            Ok(completion) => {
                return self.response(&decision.selected_provider, completion, &request, &decision, None);
            }
            Err(e) => e,
        };

        for fallback in &decision.fallback_chain {
            info!(
                from = %decision.selected_provider,
                to = %fallback,
                "Falling back to general provider"
            );
            match self.call(fallback, request.clone()).await {
                Ok(completion) => {
                    let from = Some(decision.selected_provider.clone());
                    return self.response(fallback, completion, &request, &decision, from);
                }
                Err(e) => last_error = e,
            }
        }

        let mut failed = ModelResponse::failure(decision.category, last_error.to_string());
        failed.decision = Some(decision);
        failed
    }

    /// JSON-structured invocation of the analytic or general provider.
    ///
    /// Any failure, including unparseable output, yields an empty map.
    pub async fn invoke_structured(
        &self,
        target: StructuredTarget,
        system: &str,
        prompt: &str,
    ) -> serde_json::Map<String, serde_json::Value> {
        let id = self.selector.provider_for(target.role()).to_string();
        let Some(provider) = self.providers.get(&id).cloned() else {
            warn!(provider = %id, "Structured target not configured");
            return serde_json::Map::new();
        };

        let request = self.request(prompt, Some(system));
        let result = match tokio::time::timeout(self.settings.call_timeout, provider.complete_json(request)).await {
            Ok(r) => r,
            Err(_) => Err(self.timeout_error(&id)),
        };

        match result {
            Ok(serde_json::Value::Object(map)) => {
                self.registry.mark(&id, true).await;
                map
            }
            Ok(other) => {
                self.registry.mark(&id, true).await;
                warn!(provider = %id, kind = %json_kind(&other), "Structured response is not an object");
                serde_json::Map::new()
            }
            Err(e @ ProviderError::InvalidResponse(_)) => {
                self.registry.mark(&id, true).await;
                warn!(provider = %id, error = %e, "Structured response could not be parsed");
                serde_json::Map::new()
            }
            Err(e) => {
                self.registry.mark(&id, false).await;
                warn!(provider = %id, error = %e, "Structured invocation failed");
                serde_json::Map::new()
            }
        }
    }

    /// Fold an external tool's output into a user-facing answer.
    ///
    /// Uses the analytic provider, or the general one when the analytic
    /// provider is unavailable. On failure the raw tool output is returned
    /// with an apology.
    pub async fn combine_tool_result(
        &self,
        original_message: &str,
        tool_name: &str,
        tool_result: &str,
    ) -> ModelResponse {
        let category = self.classify(original_message);
        let analytic = self.selector.provider_for(ProviderRole::Analytic);
        let general = self.selector.provider_for(ProviderRole::General);
        let target = if self.providers.contains_key(analytic) && self.registry.is_available(analytic).await {
            analytic
        } else {
            general
        };

        let prompt = format!(
            "Original user message: {original_message}\n\n\
             Tool used: {tool_name}\n\n\
             Tool result:\n{tool_result}\n\n\
             Write a complete answer that incorporates the tool result naturally."
        );
        let request = self.request(&prompt, Some(TOOL_SYSTEM_PROMPT));
        let decision = RoutingDecision {
            category,
            selected_provider: target.to_string(),
            fallback_chain: Vec::new(),
            reason: format!("combining {tool_name} output"),
        };

        match self.call(target, request.clone()).await {
            Ok(completion) => self.response(target, completion, &request, &decision, None),
            Err(e) => {
                warn!(provider = %target, tool = %tool_name, error = %e, "Failed to combine tool result");
                let text = format!(
                    "Tool result: {tool_result}\n\nSorry, I could not write a complete answer."
                );
                ModelResponse {
                    token_estimate: TokenEstimate::from_texts(
                        "",
                        None,
                        &text,
                        self.settings.chars_per_token,
                    ),
                    text,
                    provider_id: SYSTEM_PROVIDER.into(),
                    model_id: tool_name.to_string(),
                    category,
                    timestamp: chrono::Utc::now(),
                    error: Some(e.to_string()),
                    decision: Some(decision),
                    fallback_from: None,
                }
            }
        }
    }

    fn request(&self, prompt: &str, system: Option<&str>) -> CompletionRequest {
        let mut request = CompletionRequest::new(prompt)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);
        if let Some(sys) = system {
            request = request.with_system(sys);
        }
        request
    }

    /// Invoke one provider under the call deadline and record the outcome.
    async fn call(
        &self,
        provider_id: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let Some(provider) = self.providers.get(provider_id).cloned() else {
            return Err(ProviderError::NotConfigured(provider_id.to_string()));
        };

        debug!(provider = %provider_id, model = %provider.model(), "Invoking provider");

        let result = match tokio::time::timeout(self.settings.call_timeout, provider.complete(request)).await {
            Ok(r) => r,
            Err(_) => Err(self.timeout_error(provider_id)),
        };

        match result {
            Ok(completion) => {
                self.registry.mark(provider_id, true).await;
                Ok(completion)
            }
            Err(e) => {
                warn!(provider = %provider_id, error = %e, "Provider invocation failed");
                self.registry.mark(provider_id, false).await;
                Err(e)
            }
        }
    }

    fn timeout_error(&self, provider_id: &str) -> ProviderError {
        ProviderError::Timeout(format!(
            "Provider '{provider_id}' timed out after {}s",
            self.settings.call_timeout.as_secs()
        ))
    }

    fn response(
        &self,
        provider_id: &str,
        completion: CompletionResponse,
        request: &CompletionRequest,
        decision: &RoutingDecision,
        fallback_from: Option<String>,
    ) -> ModelResponse {
        let model_id = if completion.model.is_empty() {
            self.providers
                .get(provider_id)
                .map(|p| p.model().to_string())
                .unwrap_or_default()
        } else {
            completion.model
        };

        ModelResponse {
            token_estimate: TokenEstimate::from_texts(
                &request.prompt,
                request.system.as_deref(),
                &completion.text,
                self.settings.chars_per_token,
            ),
            text: completion.text,
            provider_id: provider_id.to_string(),
            model_id,
            category: decision.category,
            timestamp: chrono::Utc::now(),
            error: None,
            decision: Some(decision.clone()),
            fallback_from,
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_core::Message;
    use std::sync::Mutex;

    /// A scripted provider: fixed reply or fixed error, with a call log.
    struct ScriptedProvider {
        name: String,
        reply: Result<String, ProviderError>,
        json: Option<serde_json::Value>,
        healthy: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn ok(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                reply: Ok(format!("answer from {name}")),
                json: None,
                healthy: true,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                reply: Err(ProviderError::ApiError {
                    status_code: 500,
                    message: "Internal Server Error".into(),
                }),
                json: None,
                healthy: false,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn with_json(name: &str, json: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                reply: Ok(String::new()),
                json: Some(json),
                healthy: true,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn model(&self) -> &str {
            "scripted-1"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
            self.prompts.lock().unwrap().push(request.prompt);
            self.reply.clone().map(|text| CompletionResponse {
                text,
                model: String::new(),
            })
        }

        async fn complete_json(&self, request: CompletionRequest) -> Result<serde_json::Value, ProviderError> {
            self.prompts.lock().unwrap().push(request.prompt);
            match &self.json {
                Some(v) => Ok(v.clone()),
                None => Err(ProviderError::InvalidResponse("not json".into())),
            }
        }

        async fn health_check(&self) -> Result<bool, ProviderError> {
            Ok(self.healthy)
        }
    }

    /// A provider that never answers.
    struct HangingProvider;

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "deepseek"
        }

        fn model(&self) -> &str {
            "deepseek-chat"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::Timeout("unreachable".into()))
        }
    }

    fn router(providers: Vec<Arc<dyn Provider>>) -> Router {
        Router::from_config(providers, &RoutingConfig::default())
    }

    #[test]
    fn oversized_health_interval_saturates() {
        let config = RoutingConfig {
            health_check_interval_secs: u64::MAX,
            ..RoutingConfig::default()
        };
        let settings = RouterSettings::from_config(&config);
        assert_eq!(settings.health_check_interval, chrono::Duration::MAX);
    }

    #[tokio::test]
    async fn routes_by_category() {
        let openai = ScriptedProvider::ok("openai");
        let deepseek = ScriptedProvider::ok("deepseek");
        let r = router(vec![openai.clone(), deepseek.clone()]);

        let resp = r.route("Resolva a equação 2x+3=0", None, None).await;
        assert_eq!(resp.category, Category::Complex);
        assert_eq!(resp.provider_id, "deepseek");
        assert_eq!(resp.model_id, "scripted-1");
        assert!(!resp.is_error());

        let resp = r.route("Bom dia", None, None).await;
        assert_eq!(resp.category, Category::Simple);
        assert_eq!(resp.provider_id, "openai");
        assert_eq!(openai.calls(), 1);
        assert_eq!(deepseek.calls(), 1);
    }

    #[tokio::test]
    async fn analytic_failure_falls_back_to_general() {
        let anthropic = ScriptedProvider::failing("anthropic");
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![anthropic.clone(), openai.clone()]);

        let resp = r.route("Compare Rust e Go", None, None).await;
        assert_eq!(resp.category, Category::Analytical);
        assert_eq!(resp.provider_id, "openai");
        assert_eq!(resp.fallback_from.as_deref(), Some("anthropic"));
        assert!(!resp.is_error());
        assert_eq!(resp.decision.unwrap().fallback_chain, vec!["openai"]);

        assert!(!r.registry().is_available("anthropic").await);
        assert!(r.registry().is_available("openai").await);
        assert_eq!(anthropic.calls(), 1);
        assert_eq!(openai.calls(), 1);
    }

    #[tokio::test]
    async fn non_analytic_failure_is_surfaced() {
        let gemini = ScriptedProvider::failing("gemini");
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![gemini.clone(), openai.clone()]);

        let resp = r.route("Crie uma história sobre robôs", None, None).await;
        assert!(resp.is_error());
        assert_eq!(resp.provider_id, SYSTEM_PROVIDER);
        assert_eq!(resp.category, Category::Creative);
        assert_eq!(openai.calls(), 0);
        assert!(!r.registry().is_available("gemini").await);
    }

    #[tokio::test]
    async fn unavailable_provider_is_skipped_next_time() {
        let gemini = ScriptedProvider::failing("gemini");
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![gemini.clone(), openai.clone()]);

        let _ = r.route("Crie um poema", None, None).await;
        let resp = r.route("Crie outro poema", None, None).await;
        assert_eq!(resp.provider_id, "openai");
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn no_providers_yields_error_response() {
        let r = router(vec![]);
        let resp = r.route("Olá", None, None).await;
        assert!(resp.is_error());
        assert!(resp.error.unwrap().contains("No provider available"));
    }

    #[tokio::test]
    async fn both_analytic_and_general_fail() {
        let anthropic = ScriptedProvider::failing("anthropic");
        let openai = ScriptedProvider::failing("openai");
        let r = router(vec![anthropic, openai]);

        let resp = r.route("Analise este texto", None, None).await;
        assert!(resp.is_error());
        assert!(resp.decision.is_some());
        assert!(r.registry().list_available().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out() {
        let openai = ScriptedProvider::ok("openai");
        let mut config = RoutingConfig::default();
        config.call_timeout_secs = 1;
        let r = Router::from_config(vec![Arc::new(HangingProvider), openai], &config);

        let resp = r.route("Calcule 2+2", None, None).await;
        assert!(resp.is_error());
        assert!(resp.error.unwrap().contains("timed out"));
        assert!(!r.registry().is_available("deepseek").await);
    }

    #[tokio::test]
    async fn context_prefixes_prompt_but_not_classification() {
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![openai.clone()]);

        let mut ctx = RelevantContext::empty();
        ctx.active_messages = vec![Message::user("Resolva a equação")];

        let resp = r.route("Obrigado!", None, Some(&ctx)).await;
        assert_eq!(resp.category, Category::Simple);
        let prompt = openai.last_prompt().unwrap();
        assert!(prompt.starts_with("Context: User: Resolva a equação"));
        assert!(prompt.ends_with("Question: Obrigado!"));
    }

    #[tokio::test]
    async fn token_estimate_uses_prompt_and_output() {
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![openai]);

        // 16-char prompt; "answer from openai" is 18 chars
        let resp = r.route("abcdefghijklmnop", None, None).await;
        assert_eq!(resp.token_estimate.input, 4);
        assert_eq!(resp.token_estimate.output, 18 / 4);
        assert_eq!(resp.token_estimate.total, 4 + 18 / 4);
    }

    #[tokio::test]
    async fn stale_providers_are_probed() {
        let anthropic = ScriptedProvider::failing("anthropic");
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![anthropic, openai]);

        let old = chrono::Utc::now() - chrono::Duration::seconds(120);
        r.registry().mark_at("openai", false, old).await;
        r.registry().mark_at("anthropic", true, old).await;

        r.probe_stale().await;
        assert!(r.registry().is_available("openai").await);
        assert!(!r.registry().is_available("anthropic").await);
    }

    #[tokio::test]
    async fn structured_returns_object_or_empty() {
        let anthropic = ScriptedProvider::with_json("anthropic", serde_json::json!({"topic": "rust"}));
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![anthropic, openai]);

        let map = r.invoke_structured(StructuredTarget::Analytic, "sys", "p").await;
        assert_eq!(map["topic"], "rust");

        // openai scripted without json ⇒ parse failure ⇒ empty map
        let map = r.invoke_structured(StructuredTarget::General, "sys", "p").await;
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn structured_unconfigured_target_is_empty() {
        let r = router(vec![ScriptedProvider::ok("openai")]);
        assert!(r.invoke_structured(StructuredTarget::Analytic, "s", "p").await.is_empty());
    }

    #[tokio::test]
    async fn combine_uses_general_when_analytic_down() {
        let anthropic = ScriptedProvider::failing("anthropic");
        let openai = ScriptedProvider::ok("openai");
        let r = router(vec![anthropic, openai.clone()]);
        r.registry().mark("anthropic", false).await;

        let resp = r.combine_tool_result("Pesquise Rust", "search_web", "Rust 1.88 released").await;
        assert_eq!(resp.provider_id, "openai");
        assert!(openai.last_prompt().unwrap().contains("Rust 1.88 released"));
    }

    #[tokio::test]
    async fn combine_failure_quotes_raw_result() {
        let openai = ScriptedProvider::failing("openai");
        let r = router(vec![openai]);

        let resp = r.combine_tool_result("Rode isto", "execute_code", "42").await;
        assert!(resp.is_error());
        assert!(resp.text.starts_with("Tool result: 42"));
    }

    #[tokio::test]
    async fn custom_classifier_is_used() {
        struct AlwaysCreative;
        impl Classifier for AlwaysCreative {
            fn classify(&self, _query: &str) -> Category {
                Category::Creative
            }
        }

        let gemini = ScriptedProvider::ok("gemini");
        let r = router(vec![gemini, ScriptedProvider::ok("openai")])
            .with_classifier(Arc::new(AlwaysCreative));
        let resp = r.route("Resolva", None, None).await;
        assert_eq!(resp.provider_id, "gemini");
    }
}
