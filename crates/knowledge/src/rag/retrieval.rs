//! Two-tier candidate retrieval.
//!
//! A question naming a known dish is searched by the dish name alone, which
//! keeps the conversational wrapper ("Cho tôi công thức ...") out of the
//! embedding. Anything else falls through to a search on the full question.

use crate::embeddings::EmbeddingProvider;
use crate::rag::types::{Retrieval, RetrievalTier};
use crate::vector_store::VectorStore;
use cookbook_core::config::{KeywordRule, RetrievalConfig};
use cookbook_core::AppResult;

/// Find the first configured keyword contained in the question.
///
/// Matching is case-insensitive over Unicode and follows list order.
pub fn match_keyword<'a>(question: &str, rules: &'a [KeywordRule]) -> Option<&'a KeywordRule> {
    let question = question.to_lowercase();
    rules
        .iter()
        .filter(|rule| !rule.keyword.is_empty())
        .find(|rule| question.contains(&rule.keyword.to_lowercase()))
}

/// Run the keyword tier, or the semantic tier when no keyword matches.
pub async fn retrieve(
    question: &str,
    embedder: &dyn EmbeddingProvider,
    store: &dyn VectorStore,
    config: &RetrievalConfig,
) -> AppResult<Retrieval> {
    let (tier, search_text, top_k) = match match_keyword(question, &config.keywords) {
        Some(rule) => (
            RetrievalTier::Keyword {
                keyword: rule.keyword.clone(),
                category: rule.category.clone(),
            },
            rule.keyword.clone(),
            config.keyword_top_k,
        ),
        None => (
            RetrievalTier::Semantic,
            question.to_string(),
            config.semantic_top_k,
        ),
    };

    tracing::debug!(tier = tier.label(), top_k, "Searching for: {}", search_text);

    let embedding = embedder.embed(&search_text).await?;
    let candidates = store.search(&embedding, top_k).await?;

    tracing::info!(
        tier = tier.label(),
        candidates = candidates.len(),
        top_score = candidates.first().map(|c| c.score).unwrap_or(0.0),
        "Retrieved candidates"
    );

    Ok(Retrieval {
        tier,
        search_text,
        top_k,
        candidates,
    })
}
