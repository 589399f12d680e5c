//! File-based conversation store: one JSON document per conversation.
//!
//! Storage location: `~/.parley/conversations/<sha256(conversation id)>.json`
//!
//! Sender identities (phone numbers, user handles) never appear in file
//! names. Writes go to a temporary sibling and are renamed into place, so a
//! crash mid-write leaves the previous version intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parley_core::error::PersistenceError;
use parley_core::{ConversationId, ConversationMemory, ConversationStore};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(path = %dir.display(), "File conversation store opened");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a conversation.
    pub fn path_for(&self, id: &ConversationId) -> PathBuf {
        let digest = Sha256::digest(id.as_str().as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    async fn read(&self, path: &Path) -> Result<Option<ConversationMemory>, PersistenceError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistenceError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| PersistenceError::Corrupted(format!("{}: {e}", path.display())))
    }

    async fn write(&self, memory: &ConversationMemory) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            PersistenceError::Storage(format!("Failed to create conversation directory: {e}"))
        })?;

        let json = serde_json::to_string_pretty(memory).map_err(|e| {
            PersistenceError::Serialization {
                conversation_id: memory.conversation_id.to_string(),
                reason: e.to_string(),
            }
        })?;

        let path = self.path_for(&memory.conversation_id);
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| PersistenceError::Storage(format!("Failed to write conversation file: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PersistenceError::Storage(format!("Failed to replace conversation file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl ConversationStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, id: &ConversationId) -> Result<Option<ConversationMemory>, PersistenceError> {
        self.read(&self.path_for(id)).await
    }

    async fn get_or_create(&self, id: &ConversationId) -> Result<ConversationMemory, PersistenceError> {
        if let Some(memory) = self.get(id).await? {
            return Ok(memory);
        }
        let memory = ConversationMemory::new(id.clone());
        self.write(&memory).await?;
        Ok(memory)
    }

    async fn append_and_save(&self, memory: &ConversationMemory) -> Result<(), PersistenceError> {
        self.write(memory).await
    }

    async fn list(&self) -> Result<Vec<ConversationId>, PersistenceError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::Storage(e.to_string())),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PersistenceError::Storage(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read(&path).await {
                Ok(Some(memory)) => ids.push(memory.conversation_id),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Skipping unreadable conversation file"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
