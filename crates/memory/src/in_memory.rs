//! In-memory store: useful for testing and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parley_core::error::PersistenceError;
use parley_core::{ConversationId, ConversationMemory, ConversationStore};
use tokio::sync::RwLock;

/// A process-local conversation store backed by a map.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    conversations: Arc<RwLock<HashMap<ConversationId, ConversationMemory>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, id: &ConversationId) -> Result<Option<ConversationMemory>, PersistenceError> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn get_or_create(&self, id: &ConversationId) -> Result<ConversationMemory, PersistenceError> {
        let mut conversations = self.conversations.write().await;
        let memory = conversations
            .entry(id.clone())
            .or_insert_with(|| ConversationMemory::new(id.clone()));
        Ok(memory.clone())
    }

    async fn append_and_save(&self, memory: &ConversationMemory) -> Result<(), PersistenceError> {
        self.conversations
            .write()
            .await
            .insert(memory.conversation_id.clone(), memory.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConversationId>, PersistenceError> {
        let mut ids: Vec<ConversationId> = self.conversations.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
