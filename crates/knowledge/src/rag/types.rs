//! Chat request/response types.

use crate::recipe::RecipeId;
use crate::vector_store::ScoredDocument;
use serde::{Deserialize, Serialize};

/// Incoming question.
///
/// `question` is optional at the wire level so a missing field is reported
/// as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// A recipe used as a candidate for the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub id: RecipeId,
}

/// Which search path produced the candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalTier {
    /// A configured keyword appeared in the question; the keyword was searched.
    Keyword {
        keyword: String,
        category: Option<String>,
    },
    /// No keyword matched; the whole question was searched.
    Semantic,
}

impl RetrievalTier {
    pub fn label(&self) -> &'static str {
        match self {
            RetrievalTier::Keyword { .. } => "keyword",
            RetrievalTier::Semantic => "semantic",
        }
    }
}

/// Outcome of the two-tier search.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub tier: RetrievalTier,

    /// Text that was embedded for the search
    pub search_text: String,

    /// Number of candidates requested
    pub top_k: usize,

    /// Candidates in rank order
    pub candidates: Vec<ScoredDocument>,
}

/// Answer returned to callers.
///
/// Serializes to exactly `{"answer", "sources"}`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,

    pub sources: Vec<SourceRef>,

    /// Internal: tier used, for logs and the CLI
    #[serde(skip)]
    pub tier: RetrievalTier,

    /// Internal: context handed to the model
    #[serde(skip)]
    pub context: String,
}
