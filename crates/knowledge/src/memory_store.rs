//! In-memory vector store using cosine similarity.
//!
//! Backed by a `Vec` behind a `tokio::sync::RwLock`. Used by tests and by
//! callers that want to serve a dataset without touching disk.

use crate::vector_store::{cosine_similarity, rank, EmbeddedDocument, ScoredDocument, VectorStore};
use async_trait::async_trait;
use cookbook_core::AppResult;
use tokio::sync::RwLock;

/// An in-memory vector store. Documents keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<Vec<EmbeddedDocument>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn replace_all(&self, documents: Vec<EmbeddedDocument>) -> AppResult<()> {
        let mut stored = self.documents.write().await;
        *stored = documents;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<ScoredDocument>> {
        let stored = self.documents.read().await;

        let scored = stored
            .iter()
            .map(|doc| ScoredDocument {
                document: doc.document.clone(),
                score: cosine_similarity(&doc.embedding, query_embedding),
            })
            .collect();

        Ok(rank(scored, top_k))
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.documents.read().await.len())
    }
}
