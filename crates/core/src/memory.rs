//! Conversation memory: the bounded, summarized record of one conversation.
//!
//! One [`ConversationMemory`] exists per sender identity. It holds:
//! - the full chronological message log (pruned by age past a threshold)
//! - the active window, a capped suffix of the log used as model context
//! - the current topic and summary, extracted by a [`Summarizer`]
//! - the routing history, from which provider preference and
//!   context-switch counts are derived
//!
//! Persistence goes through the [`ConversationStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, SummarizationError};
use crate::message::{ConversationId, Message};
use crate::routing::Category;

/// Coarse kind of conversation, as judged by the summarizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    #[default]
    General,
    Technical,
    Creative,
    Analytical,
    Personal,
}

impl TopicCategory {
    /// Case-insensitive parse of a summarizer label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "general" => Some(Self::General),
            "technical" => Some(Self::Technical),
            "creative" => Some(Self::Creative),
            "analytical" => Some(Self::Analytical),
            "personal" => Some(Self::Personal),
            _ => None,
        }
    }
}

/// The active topic of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub category: TopicCategory,
    pub summary: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl Topic {
    /// Neutral value used whenever topic extraction fails.
    pub fn fallback() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// Running summary of the active window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
}

impl Summary {
    /// Neutral value used whenever summarization fails.
    pub fn fallback() -> Self {
        Self::default()
    }
}

/// One provider invocation that answered in this conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRecord {
    pub provider_id: String,
    pub model_id: String,
    pub category: Category,
    pub timestamp: DateTime<Utc>,
}

/// The provider that answered most recently; no blending across history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPreference {
    pub provider_id: String,
    pub model_id: String,
    pub last_category: Category,
}

impl From<&RoutingRecord> for ProviderPreference {
    fn from(record: &RoutingRecord) -> Self {
        Self {
            provider_id: record.provider_id.clone(),
            model_id: record.model_id.clone(),
            last_category: record.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub last_update: DateTime<Utc>,
    pub message_count: usize,
    pub context_switch_count: usize,
    /// Number of pruning passes; never decreases.
    pub prune_count: u64,
}

/// The full memory record of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMemory {
    pub conversation_id: ConversationId,

    /// Chronological, append-only (modulo pruning)
    pub messages: Vec<Message>,

    /// Capped suffix of `messages`
    pub active_window: Vec<Message>,

    pub topic: Topic,
    pub summary: Summary,

    /// Provider invocations, oldest first
    #[serde(default)]
    pub routing_history: Vec<RoutingRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_preference: Option<ProviderPreference>,

    pub metadata: MemoryMetadata,
    pub created_at: DateTime<Utc>,
}

impl ConversationMemory {
    /// A fresh, empty memory record.
    pub fn new(conversation_id: ConversationId) -> Self {
        let now = Utc::now();
        Self {
            conversation_id,
            messages: Vec::new(),
            active_window: Vec::new(),
            topic: Topic::fallback(),
            summary: Summary::fallback(),
            routing_history: Vec::new(),
            provider_preference: None,
            metadata: MemoryMetadata {
                last_update: now,
                message_count: 0,
                context_switch_count: 0,
                prune_count: 0,
            },
            created_at: now,
        }
    }

    /// Whether a message with this ID is already in the log.
    pub fn contains_message(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    /// Count adjacent routing records whose provider differs.
    pub fn count_context_switches(history: &[RoutingRecord]) -> usize {
        history
            .windows(2)
            .filter(|pair| pair[0].provider_id != pair[1].provider_id)
            .count()
    }

    /// Preference derived from the most recent routing record.
    pub fn latest_preference(history: &[RoutingRecord]) -> Option<ProviderPreference> {
        history.last().map(ProviderPreference::from)
    }
}

/// What the memory manager hands back to prime the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantContext {
    pub active_topic: Topic,
    pub active_messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_preference: Option<ProviderPreference>,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MemoryMetadata>,
}

impl RelevantContext {
    /// Context for a conversation that has no record yet.
    pub fn empty() -> Self {
        Self {
            active_topic: Topic::fallback(),
            active_messages: Vec::new(),
            provider_preference: None,
            summary: Summary::fallback(),
            metadata: None,
        }
    }

    pub fn from_memory(memory: &ConversationMemory) -> Self {
        Self {
            active_topic: memory.topic.clone(),
            active_messages: memory.active_window.clone(),
            provider_preference: memory.provider_preference.clone(),
            summary: memory.summary.clone(),
            metadata: Some(memory.metadata.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active_messages.is_empty()
    }

    /// Render the context as a plain-text block for a prompt, keeping at
    /// most `max_messages` of the most recent window entries.
    pub fn render(&self, max_messages: usize) -> String {
        let mut out = String::new();
        if !self.active_topic.summary.is_empty() {
            out.push_str(&format!("Topic: {}\n", self.active_topic.summary));
        }
        if !self.summary.text.is_empty() {
            out.push_str(&format!("Summary: {}\n", self.summary.text));
        }
        let skip = self.active_messages.len().saturating_sub(max_messages);
        for msg in self.active_messages.iter().skip(skip) {
            out.push_str(&format!("{}: {}\n", msg.speaker(), msg.text));
        }
        out.trim_end().to_string()
    }
}

/// Which analysis the summarizer should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTask {
    Topic,
    Summary,
}

/// Result of one summarizer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Topic(Topic),
    Summary(Summary),
}

/// Extracts topic and summary from a window of messages.
///
/// Failures and malformed output are treated identically by callers: the
/// neutral fallback value is substituted.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(
        &self,
        messages: &[Message],
        task: AnalysisTask,
    ) -> std::result::Result<Analysis, SummarizationError>;
}

/// Persistence of conversation records.
///
/// The memory manager owns every mutation; the store only loads and saves
/// whole records keyed by conversation identity.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The backend name (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Look up a conversation without creating it.
    async fn get(
        &self,
        id: &ConversationId,
    ) -> std::result::Result<Option<ConversationMemory>, PersistenceError>;

    /// Load a conversation, creating and persisting an empty one if absent.
    async fn get_or_create(
        &self,
        id: &ConversationId,
    ) -> std::result::Result<ConversationMemory, PersistenceError>;

    /// Persist a record whose log has just had a message appended.
    async fn append_and_save(
        &self,
        memory: &ConversationMemory,
    ) -> std::result::Result<(), PersistenceError>;

    /// All known conversation ids.
    async fn list(&self) -> std::result::Result<Vec<ConversationId>, PersistenceError>;
}
