//! Model routing for Parley.
//!
//! - [`KeywordClassifier`] maps a query to a [`Category`](parley_core::Category)
//! - [`ToolDetector`] decides whether a message belongs to an external tool
//! - [`AvailabilityRegistry`] tracks which providers are up
//! - [`ModelSelector`] picks a provider for a category
//! - [`Router`] composes them and invokes providers with fallback

pub mod availability;
pub mod classifier;
pub mod router;
pub mod selector;

pub use availability::AvailabilityRegistry;
pub use classifier::{Classifier, KeywordClassifier, ToolDetector};
pub use router::{Router, RouterSettings, StructuredTarget};
pub use selector::{ModelSelector, Selection};
