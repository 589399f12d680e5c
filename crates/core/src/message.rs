//! Message and conversation identity types.
//!
//! A [`Message`] is the immutable value object appended to a conversation
//! log: user input on the way in, the routed model answer on the way out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routing::Category;

/// Marker appended to message text cut at the size cap.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Unique identifier for a conversation: one per sender identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single message in a conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID (unique within its conversation)
    pub id: String,

    /// `true` for user input, `false` for agent output
    pub is_from_user: bool,

    /// The text content, already truncated to the configured cap
    pub text: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,

    /// Provider that produced this message (agent messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// Model that produced this message (agent messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// Category the prompt was classified as (agent messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Essential routing metadata (token estimates, source, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(true, text)
    }

    /// Create a new agent message.
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(false, text)
    }

    fn new(is_from_user: bool, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_from_user,
            text: text.into(),
            timestamp: Utc::now(),
            provider_id: None,
            model_id: None,
            category: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Replace the generated ID with a caller-supplied one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Override the creation time (imports, replays).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Cap the text at `max_chars` characters, appending [`TRUNCATION_MARKER`].
    pub fn truncated(mut self, max_chars: usize) -> Self {
        self.text = truncate_text(&self.text, max_chars);
        self
    }

    /// Speaker label used when rendering transcripts for a model.
    pub fn speaker(&self) -> &'static str {
        if self.is_from_user { "User" } else { "Assistant" }
    }
}

/// Truncate on a character boundary.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
