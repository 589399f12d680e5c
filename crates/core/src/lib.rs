//! # Parley Core
//!
//! Domain types, traits, and error definitions for the Parley conversational
//! router. This crate has **no runtime dependencies**: it defines the domain
//! model that the routing, memory and provider crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here. Implementations live in
//! their respective crates:
//! - [`Provider`]: one adapter per external language-model service
//! - [`Summarizer`]: topic/summary extraction over a message window
//! - [`ConversationStore`]: persistence of conversation records
//! - [`ToolInvoker`]: external capability invocation
//!
//! This keeps the dependency graph pointing inward and lets tests swap in
//! scripted implementations.

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod routing;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use memory::{
    Analysis, AnalysisTask, ConversationMemory, ConversationStore, MemoryMetadata, ProviderPreference, RelevantContext,
    RoutingRecord, Sentiment, Summarizer, Summary, Topic, TopicCategory,
};
pub use message::{ConversationId, Message};
pub use provider::{CompletionRequest, CompletionResponse, Provider};
pub use routing::{
    Category, ModelResponse, ProviderRole, ProviderStatus, RoutingDecision, SYSTEM_PROVIDER,
    TokenEstimate,
};
pub use tool::{ToolInvoker, ToolKind, ToolRequest};
