//! Memory manager: the bounded, summarized record of each conversation.
//!
//! `record` is the only writer. For every new message it:
//! 1. truncates the text and keeps only essential routing metadata
//! 2. appends to the log and to the capped active window
//! 3. logs the provider invocation for agent messages
//! 4. prunes by age once the log crosses the cleanup threshold
//! 5. refreshes topic and summary from the active window
//! 6. persists the record
//!
//! Writes to one conversation are serialized; different conversations
//! proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use parley_config::MemoryConfig;
use parley_core::error::PersistenceError;
use parley_core::{
    Analysis, AnalysisTask, ConversationId, ConversationMemory, ConversationStore, Message,
    ModelResponse, RelevantContext, RoutingRecord, Summarizer, Summary, Topic,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Metadata keys kept on agent messages; everything else is dropped.
pub const ESSENTIAL_METADATA_KEYS: &[&str] = &[
    "source",
    "category",
    "model",
    "provider",
    "input_tokens",
    "output_tokens",
    "total_tokens",
    "fallback_from",
    "error",
];

#[derive(Debug, Clone)]
pub struct MemorySettings {
    pub active_window: usize,
    pub cleanup_threshold: usize,
    pub retention: Duration,
    pub max_message_chars: usize,
}

impl MemorySettings {
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self {
            active_window: config.active_window,
            cleanup_threshold: config.cleanup_threshold,
            retention: i64::try_from(config.retention_hours)
                .ok()
                .and_then(Duration::try_hours)
                .unwrap_or(Duration::MAX),
            max_message_chars: config.max_message_chars,
        }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::from_config(&MemoryConfig::default())
    }
}

pub struct MemoryManager {
    store: Arc<dyn ConversationStore>,
    summarizer: Arc<dyn Summarizer>,
    settings: MemorySettings,
    locks: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl MemoryManager {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        summarizer: Arc<dyn Summarizer>,
        settings: MemorySettings,
    ) -> Self {
        Self {
            store,
            summarizer,
            settings,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &MemorySettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    async fn lock_for(&self, id: &ConversationId) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the conversation's lock entry once no other task holds it.
    async fn release_lock(&self, id: &ConversationId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
    }

    /// Record a user message.
    pub async fn record_user(
        &self,
        id: &ConversationId,
        text: &str,
        message_id: Option<&str>,
    ) -> Result<ConversationMemory, PersistenceError> {
        let mut message = Message::user(text);
        if let Some(mid) = message_id {
            message = message.with_id(mid);
        }
        self.record(id, message, None).await
    }

    /// Record an agent reply along with the response that produced it.
    pub async fn record_agent(
        &self,
        id: &ConversationId,
        response: &ModelResponse,
        message_id: Option<&str>,
    ) -> Result<ConversationMemory, PersistenceError> {
        let mut message = Message::agent(response.text.clone());
        if let Some(mid) = message_id {
            message = message.with_id(mid);
        }
        self.record(id, message, Some(response)).await
    }

    /// Append a message to a conversation.
    ///
    /// A message whose id is already in the log is ignored and the stored
    /// record is returned unchanged. Summarizer failures fall back to
    /// neutral values; store failures propagate.
    pub async fn record(
        &self,
        id: &ConversationId,
        message: Message,
        response: Option<&ModelResponse>,
    ) -> Result<ConversationMemory, PersistenceError> {
        let lock = self.lock_for(id).await;
        let result = {
            let _guard = lock.lock().await;
            self.record_locked(id, message, response).await
        };
        self.release_lock(id, lock).await;
        result
    }

    async fn record_locked(
        &self,
        id: &ConversationId,
        message: Message,
        response: Option<&ModelResponse>,
    ) -> Result<ConversationMemory, PersistenceError> {
        let mut memory = self.store.get_or_create(id).await?;
        if memory.contains_message(&message.id) {
            debug!(conversation = %id, message_id = %message.id, "Duplicate message ignored");
            return Ok(memory);
        }

        let message = self.prepare(message, response);
        let is_from_user = message.is_from_user;

        memory.messages.push(message.clone());
        memory.active_window.push(message);
        let overflow = memory
            .active_window
            .len()
            .saturating_sub(self.settings.active_window);
        memory.active_window.drain(..overflow);

        if !is_from_user {
            if let Some(resp) = response.filter(|r| !r.is_error()) {
                memory.routing_history.push(RoutingRecord {
                    provider_id: resp.provider_id.clone(),
                    model_id: resp.model_id.clone(),
                    category: resp.category,
                    timestamp: resp.timestamp,
                });
                memory.metadata.context_switch_count =
                    ConversationMemory::count_context_switches(&memory.routing_history);
                memory.provider_preference =
                    ConversationMemory::latest_preference(&memory.routing_history);
            }
        }

        if memory.messages.len() > self.settings.cleanup_threshold {
            self.prune(&mut memory);
        }

        memory.topic = self.topic(id, &memory.active_window).await;
        memory.summary = self.summary(id, &memory.active_window).await;

        memory.metadata.message_count = memory.messages.len();
        memory.metadata.last_update = Utc::now();

        self.store.append_and_save(&memory).await?;
        debug!(
            conversation = %id,
            messages = memory.metadata.message_count,
            window = memory.active_window.len(),
            "Conversation memory updated"
        );
        Ok(memory)
    }

    /// Context for priming the router. Never mutates the record.
    pub async fn relevant_context(
        &self,
        id: &ConversationId,
        incoming: &str,
    ) -> Result<RelevantContext, PersistenceError> {
        let context = match self.store.get(id).await? {
            Some(memory) => RelevantContext::from_memory(&memory),
            None => RelevantContext::empty(),
        };
        debug!(
            conversation = %id,
            incoming_chars = incoming.chars().count(),
            window = context.active_messages.len(),
            "Relevant context loaded"
        );
        Ok(context)
    }

    fn prepare(&self, message: Message, response: Option<&ModelResponse>) -> Message {
        let mut message = message.truncated(self.settings.max_message_chars);

        if let (false, Some(resp)) = (message.is_from_user, response) {
            message.provider_id = Some(resp.provider_id.clone());
            message.model_id = Some(resp.model_id.clone());
            message.category = Some(resp.category);
            message.metadata.extend(resp.essential_metadata());
        }

        message
            .metadata
            .retain(|key, _| ESSENTIAL_METADATA_KEYS.contains(&key.as_str()));
        message
    }

    fn prune(&self, memory: &mut ConversationMemory) {
        let before = memory.messages.len();

        // A retention reaching past the earliest representable time keeps everything
        if let Some(cutoff) = Utc::now().checked_sub_signed(self.settings.retention) {
            memory.messages.retain(|m| m.timestamp > cutoff);
            memory.active_window.retain(|m| m.timestamp > cutoff);
        }
        memory.metadata.prune_count += 1;

        info!(
            conversation = %memory.conversation_id,
            removed = before - memory.messages.len(),
            remaining = memory.messages.len(),
            "Pruned conversation log"
        );
    }

    async fn topic(&self, id: &ConversationId, window: &[Message]) -> Topic {
        match self.summarizer.analyze(window, AnalysisTask::Topic).await {
            Ok(Analysis::Topic(topic)) => topic,
            Ok(_) => {
                warn!(conversation = %id, summarizer = %self.summarizer.name(), "Summarizer answered the wrong task, using fallback topic");
                Topic::fallback()
            }
            Err(e) => {
                warn!(conversation = %id, summarizer = %self.summarizer.name(), error = %e, "Topic extraction failed, using fallback");
                Topic::fallback()
            }
        }
    }

    async fn summary(&self, id: &ConversationId, window: &[Message]) -> Summary {
        match self.summarizer.analyze(window, AnalysisTask::Summary).await {
            Ok(Analysis::Summary(summary)) => summary,
            Ok(_) => {
                warn!(conversation = %id, summarizer = %self.summarizer.name(), "Summarizer answered the wrong task, using fallback summary");
                Summary::fallback()
            }
            Err(e) => {
                warn!(conversation = %id, summarizer = %self.summarizer.name(), error = %e, "Summarization failed, using fallback");
                Summary::fallback()
            }
        }
    }
}
