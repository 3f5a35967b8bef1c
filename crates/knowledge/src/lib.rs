//! Recipe knowledge store and question answering.
//!
//! Turns a recipe dataset into embedded documents in a vector store, and
//! answers questions from the best-matching recipe.

pub mod document;
pub mod embeddings;
pub mod ingest;
pub mod lancedb_store;
pub mod memory_store;
pub mod rag;
pub mod recipe;
pub mod vector_store;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use document::{DocumentMetadata, RecipeDocument};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use ingest::{ingest, read_manifest, IngestManifest, IngestOptions, IngestStats, MANIFEST_FILE};
pub use lancedb_store::LanceDbStore;
pub use memory_store::InMemoryStore;
pub use rag::{chat, ChatRequest, ChatResponse, RagContext, RetrievalTier, SourceRef};
pub use recipe::{load_dataset, parse_dataset, RecipeId, RecipeRecord};
pub use vector_store::{EmbeddedDocument, ScoredDocument, VectorStore};

use cookbook_core::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Open the configured vector store.
pub fn open_store(config: &AppConfig) -> Arc<dyn VectorStore> {
    Arc::new(LanceDbStore::new(
        config.store_path(),
        config.store.table.clone(),
        config.embedding.dimensions,
    ))
}

/// Location of the ingest manifest for the configured store.
pub fn manifest_path(config: &AppConfig) -> PathBuf {
    config.store_path().join(MANIFEST_FILE)
}
