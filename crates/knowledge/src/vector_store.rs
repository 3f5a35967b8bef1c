//! Vector store abstraction for recipe documents.
//!
//! Defines a trait for backend-agnostic storage and nearest-neighbour search.

use crate::document::RecipeDocument;
use async_trait::async_trait;
use cookbook_core::AppResult;

/// A document paired with its embedding, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedDocument {
    pub document: RecipeDocument,
    pub embedding: Vec<f32>,
}

/// A search hit. Higher scores are closer matches.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: RecipeDocument,
    pub score: f32,
}

/// Trait for vector store backends.
///
/// Implementations must support:
/// - Replacing the whole collection in one write
/// - Searching for the top-k most similar documents
/// - Counting stored documents
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend name for logs and stats.
    fn backend_name(&self) -> &str;

    /// Replace all stored documents with `documents`.
    ///
    /// On error the previous contents must remain readable.
    async fn replace_all(&self, documents: Vec<EmbeddedDocument>) -> AppResult<()>;

    /// Search for the top-k most similar documents to the query embedding.
    ///
    /// Returns documents ordered by descending similarity score.
    async fn search(&self, query_embedding: &[f32], top_k: usize)
        -> AppResult<Vec<ScoredDocument>>;

    /// Number of stored documents.
    async fn count(&self) -> AppResult<usize>;
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Sort hits by descending score and keep the best `top_k`.
///
/// The sort is stable, so equal scores keep their incoming order. NaN
/// scores rank below every real score.
pub(crate) fn rank(mut hits: Vec<ScoredDocument>, top_k: usize) -> Vec<ScoredDocument> {
    let key = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
    hits.sort_by(|a, b| key(b.score).total_cmp(&key(a.score)));
    hits.truncate(top_k);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;
    use crate::recipe::RecipeId;

    fn hit(id: i64, score: f32) -> ScoredDocument {
        ScoredDocument {
            document: RecipeDocument {
                content: String::new(),
                metadata: DocumentMetadata {
                    id: RecipeId::Int(id),
                    title: String::new(),
                },
            },
            score,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let ranked = rank(vec![hit(1, 0.2), hit(2, 0.9), hit(3, 0.5)], 2);
        let ids: Vec<_> = ranked.iter().map(|h| h.document.metadata.id.clone()).collect();
        assert_eq!(ids, vec![RecipeId::Int(2), RecipeId::Int(3)]);
    }

    #[test]
    fn test_rank_ties_keep_order() {
        let ranked = rank(vec![hit(1, 0.5), hit(2, 0.5)], 5);
        assert_eq!(ranked[0].document.metadata.id, RecipeId::Int(1));
    }

    #[test]
    fn test_rank_puts_nan_scores_last() {
        let ranked = rank(vec![hit(1, f32::NAN), hit(2, 0.1), hit(3, f32::NAN), hit(4, 0.7)], 4);
        let ids: Vec<_> = ranked.iter().map(|h| h.document.metadata.id.clone()).collect();
        assert_eq!(
            ids,
            vec![RecipeId::Int(4), RecipeId::Int(2), RecipeId::Int(1), RecipeId::Int(3)]
        );
    }
}
