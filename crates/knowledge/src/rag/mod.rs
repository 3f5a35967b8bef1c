//! Retrieval-augmented answering over the recipe store.
//!
//! A question goes through keyword or semantic retrieval, the top recipe
//! becomes the prompt context, and the model answers from that one recipe.

pub mod answer;
pub mod chat;
pub mod context;
pub mod retrieval;
pub mod types;

pub use chat::chat;
pub use context::RagContext;
pub use retrieval::{match_keyword, retrieve};
pub use types::{ChatRequest, ChatResponse, Retrieval, RetrievalTier, SourceRef};
