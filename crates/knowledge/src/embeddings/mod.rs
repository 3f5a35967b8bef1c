//! Embedding providers.
//!
//! Documents and questions must be embedded by the same provider and model,
//! otherwise similarity scores are meaningless.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
