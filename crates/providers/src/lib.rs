//! LLM provider adapters for Parley.
//!
//! All adapters implement the `parley_core::Provider` trait. The
//! [`ProviderRegistry`] builds them from configuration; the routing crate
//! decides which one answers.

mod http;

pub mod anthropic;
pub mod gemini;
pub mod openai_compat;
pub mod registry;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use registry::{build_from_config, ProviderRegistry};
