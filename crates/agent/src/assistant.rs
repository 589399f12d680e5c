//! The conversational pipeline.

use std::sync::Arc;

use parley_config::AppConfig;
use parley_core::{
    ConversationId, ModelResponse, RelevantContext, Summarizer, ToolInvoker,
};
use parley_memory::{
    DisabledSummarizer, LlmSummarizer, MemoryManager, MemorySettings, store_from_config,
};
use parley_providers::build_from_config;
use parley_routing::{Router, ToolDetector};
use parley_tools::build_from_config as build_tools;
use tracing::{debug, info, warn};

use crate::prompts::PromptBuilder;

/// Ties memory, routing and tools together for one message at a time.
pub struct Assistant {
    router: Arc<Router>,
    memory: Arc<MemoryManager>,
    prompts: PromptBuilder,
    detector: ToolDetector,
    tools: Option<Arc<dyn ToolInvoker>>,
}

impl Assistant {
    pub fn new(router: Arc<Router>, memory: Arc<MemoryManager>) -> Self {
        Self {
            router,
            memory,
            prompts: PromptBuilder::default(),
            detector: ToolDetector::new(),
            tools: None,
        }
    }

    /// Wire up providers, router, summarizer, store and tool servers from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let registry = build_from_config(config);

        let summarizer: Arc<dyn Summarizer> = if config.summarizer.is_disabled() {
            Arc::new(DisabledSummarizer)
        } else {
            match registry.get(&config.summarizer.provider) {
                Some(provider) => {
                    Arc::new(LlmSummarizer::new(provider, config.summarizer.temperature))
                }
                None => {
                    warn!(
                        provider = %config.summarizer.provider,
                        "Summarizer provider has no API key, topics and summaries disabled"
                    );
                    Arc::new(DisabledSummarizer)
                }
            }
        };

        let memory = MemoryManager::new(
            store_from_config(&config.memory),
            summarizer,
            MemorySettings::from_config(&config.memory),
        );
        let router = Router::from_config(registry.into_providers(), &config.routing);

        let prompts = match &config.agent.system_prompt_override {
            Some(prompt) => PromptBuilder::with_override(prompt.clone()),
            None => PromptBuilder::new(&config.agent.name),
        };

        let assistant = Self::new(Arc::new(router), Arc::new(memory)).with_prompts(prompts);
        let tools = build_tools(&config.tools);
        if tools.is_empty() {
            assistant
        } else {
            assistant.with_tools(Arc::new(tools))
        }
    }

    /// Whether tool requests are handed to an invoker.
    pub fn has_tools(&self) -> bool {
        self.tools.is_some()
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Attach a tool invoker; without one, tool requests are answered by models.
    pub fn with_tools(mut self, tools: Arc<dyn ToolInvoker>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    /// Handle one inbound message and return the reply.
    ///
    /// Provider and tool failures come back as an error-flagged response;
    /// only persistence failures are returned as `Err`.
    pub async fn handle(
        &self,
        conversation_id: &ConversationId,
        text: &str,
        message_id: Option<&str>,
    ) -> Result<ModelResponse, parley_core::Error> {
        info!(conversation = %conversation_id, chars = text.chars().count(), "Handling message");

        self.memory.record_user(conversation_id, text, message_id).await?;
        let context = self.memory.relevant_context(conversation_id, text).await?;

        let response = match self.try_tool(text).await {
            Some(response) => response,
            None => self.answer(text, &context).await,
        };

        self.memory.record_agent(conversation_id, &response, None).await?;

        if response.is_error() {
            warn!(conversation = %conversation_id, error = ?response.error, "Replying with error response");
        }
        Ok(response)
    }

    async fn answer(&self, text: &str, context: &RelevantContext) -> ModelResponse {
        let category = self.router.classify(text);
        let system = self.prompts.system_prompt(category);
        self.router.route(text, Some(&system), Some(context)).await
    }

    async fn try_tool(&self, text: &str) -> Option<ModelResponse> {
        let request = self.detector.needs_tool(text)?;
        let Some(tools) = self.tools.as_ref() else {
            debug!(tool = %request.tool_name, "No tool invoker attached, answering with a model");
            return None;
        };

        info!(
            tool = %request.tool_name,
            server = %request.target_server,
            reason = %request.reason,
            "Handing message to tool"
        );

        let response = match tools.invoke(&request).await {
            Ok(output) => {
                self.router
                    .combine_tool_result(text, &request.tool_name, &output)
                    .await
            }
            Err(e) => {
                warn!(tool = %request.tool_name, error = %e, "Tool invocation failed");
                ModelResponse::failure(self.router.classify(text), e.to_string())
            }
        };
        Some(response)
    }
}
