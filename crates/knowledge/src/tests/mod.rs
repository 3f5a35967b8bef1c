//! Scenario tests for ingestion and question answering.

mod rag_pipeline;

use crate::embeddings::providers::MockProvider;
use crate::embeddings::EmbeddingProvider;
use crate::vector_store::{EmbeddedDocument, ScoredDocument, VectorStore};
use crate::InMemoryStore;
use async_trait::async_trait;
use cookbook_core::{AppError, AppResult};
use cookbook_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::Mutex;

pub const DIMENSIONS: usize = 256;

pub const DATASET: &str = r#"[
  {"id": 1, "title": "Phở bò", "ingredients": [{"name": "Bánh phở"}, {"name": "Thịt bò"}, {"name": "Hành lá"}], "steps": [{"title": "Nấu nước dùng xương bò"}, {"title": "Trụng bánh phở"}]},
  {"id": 2, "title": "Phở gà", "ingredients": [{"name": "Bánh phở"}, {"name": "Thịt gà"}, {"name": "Gừng"}], "steps": [{"title": "Luộc gà"}, {"title": "Trụng bánh phở"}]},
  {"id": 3, "title": "Cơm chiên dương châu", "ingredients": [{"name": "Cơm nguội"}, {"name": "Lạp xưởng"}, {"name": "Trứng"}], "steps": [{"title": "Đánh trứng"}, {"title": "Chiên cơm"}]},
  {"id": 4, "title": "Bánh mì thịt", "ingredients": [{"name": "Bánh mì"}, {"name": "Pate"}, {"name": "Chả lụa"}], "steps": [{"title": "Nướng bánh"}, {"title": "Kẹp nhân"}]},
  {"id": 5, "title": "Bún chả Hà Nội", "ingredients": [{"name": "Bún"}, {"name": "Thịt ba chỉ"}, {"name": "Nước mắm"}], "steps": [{"title": "Ướp thịt"}, {"title": "Nướng chả"}]},
  {"id": 6, "title": "Gà rán giòn", "ingredients": [{"name": "Đùi gà"}, {"name": "Bột chiên giòn"}], "steps": [{"title": "Tẩm bột"}, {"title": "Chiên ngập dầu"}]},
  {"id": "canh-chua", "title": "Canh chua cá lóc", "ingredients": [{"name": "Cá lóc"}, {"name": "Me"}, {"name": "Dứa"}], "steps": [{"title": "Nấu nước me"}, {"title": "Thả cá"}]},
  {"id": "goi-cuon", "title": "Gỏi cuốn tôm thịt", "ingredients": [{"name": "Bánh tráng"}, {"name": "Tôm"}, {"name": "Rau sống"}], "steps": [{"title": "Luộc tôm"}, {"title": "Cuốn bánh"}]}
]"#;

/// Mock embedder that remembers every text it was asked to embed.
#[derive(Debug)]
pub struct RecordingEmbedder {
    inner: MockProvider,
    pub texts: Mutex<Vec<String>>,
}

impl RecordingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: MockProvider::new(DIMENSIONS),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.texts.lock().unwrap().extend(texts.iter().cloned());
        self.inner.embed_batch(texts).await
    }
}

/// Embedder that always fails.
#[derive(Debug)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Llm("connection refused".to_string()))
    }
}

/// In-memory store that remembers the requested top-k of each search.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    pub top_ks: Mutex<Vec<usize>>,
}

impl RecordingStore {
    pub fn last_top_k(&self) -> Option<usize> {
        self.top_ks.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    fn backend_name(&self) -> &str {
        "recording"
    }

    async fn replace_all(&self, documents: Vec<EmbeddedDocument>) -> AppResult<()> {
        self.inner.replace_all(documents).await
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<ScoredDocument>> {
        self.top_ks.lock().unwrap().push(top_k);
        self.inner.search(query_embedding, top_k).await
    }

    async fn count(&self) -> AppResult<usize> {
        self.inner.count().await
    }
}

/// LLM that records requests and answers with a fixed string.
#[derive(Debug, Default)]
pub struct RecordingLlm {
    pub requests: Mutex<Vec<LlmRequest>>,
    pub fail: bool,
}

impl RecordingLlm {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last_request(&self) -> Option<LlmRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail {
            return Err(AppError::Llm("model unavailable".to_string()));
        }

        Ok(LlmResponse {
            content: "Câu trả lời mẫu".to_string(),
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
            done: true,
        })
    }
}
