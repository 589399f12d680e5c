//! Error types for the Parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; which of them escape a
//! boundary is decided per call site:
//! - provider errors stop at the router (turned into error responses)
//! - summarization errors stop at the memory manager (fallback values)
//! - persistence errors always propagate to the caller

use thiserror::Error;

use crate::routing::Category;

/// The top-level error type for all Parley operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Routing errors ---
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    // --- Summarization errors ---
    #[error("Summarization error: {0}")]
    Summarization(#[from] SummarizationError),

    // --- Persistence errors ---
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Operation not supported by provider '{provider}': {operation}")]
    Unsupported { provider: String, operation: String },
}

#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    #[error("No provider available for {category} query")]
    NoProviderAvailable { category: Category },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

#[derive(Debug, Clone, Error)]
pub enum SummarizationError {
    #[error("Summarization provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Malformed analysis output: {0}")]
    Malformed(String),

    #[error("Summarization is disabled")]
    Disabled,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to serialize conversation {conversation_id}: {reason}")]
    Serialization {
        conversation_id: String,
        reason: String,
    },

    #[error("Stored conversation is corrupted: {0}")]
    Corrupted(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool server not connected: {0}")]
    NotConnected(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn no_provider_names_category() {
        let err = RoutingError::NoProviderAvailable {
            category: Category::Creative,
        };
        assert_eq!(err.to_string(), "No provider available for creative query");
    }

    #[test]
    fn persistence_error_converts_to_top_level() {
        let err: Error = PersistenceError::Storage("disk full".into()).into();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn summarization_wraps_provider_error() {
        let err: SummarizationError = ProviderError::Network("reset".into()).into();
        assert!(err.to_string().contains("reset"));
    }
}
