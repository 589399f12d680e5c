//! Conversation memory for Parley.
//!
//! The [`MemoryManager`] owns the bounded log of each conversation; stores
//! persist it and summarizers distill the active window into a topic and a
//! summary.

pub mod file_backend;
pub mod in_memory;
pub mod manager;
pub mod summarizer;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
pub use manager::{ESSENTIAL_METADATA_KEYS, MemoryManager, MemorySettings};
pub use summarizer::{DisabledSummarizer, LlmSummarizer};

use std::sync::Arc;

use parley_config::{MemoryConfig, StoreKind};
use parley_core::ConversationStore;

/// Build the store selected in `[memory]`.
pub fn store_from_config(config: &MemoryConfig) -> Arc<dyn ConversationStore> {
    match config.store {
        StoreKind::Memory => Arc::new(InMemoryStore::new()),
        StoreKind::File => Arc::new(FileStore::new(config.resolved_store_path())),
    }
}
