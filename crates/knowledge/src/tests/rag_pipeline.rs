//! End-to-end answering with recording collaborators.

use super::{RecordingEmbedder, RecordingLlm, RecordingStore, DATASET};
use crate::document::RecipeDocument;
use crate::embeddings::EmbeddingProvider;
use crate::rag::{chat, RagContext, RetrievalTier};
use crate::recipe::{parse_dataset, RecipeId};
use crate::vector_store::{EmbeddedDocument, VectorStore};
use cookbook_core::config::{GenerationConfig, KeywordRule, RetrievalConfig};
use cookbook_core::AppError;
use cookbook_prompt::PromptDefinition;
use std::sync::Arc;

const SENTINEL: &str = "Không tìm thấy món phù hợp.";

struct Harness {
    ctx: RagContext,
    embedder: Arc<RecordingEmbedder>,
    store: Arc<RecordingStore>,
    llm: Arc<RecordingLlm>,
}

async fn harness(llm: RecordingLlm, dataset: Option<&str>) -> Harness {
    let embedder = Arc::new(RecordingEmbedder::new());
    let store = Arc::new(RecordingStore::default());
    let llm = Arc::new(llm);

    if let Some(dataset) = dataset {
        let documents: Vec<RecipeDocument> = parse_dataset(dataset)
            .unwrap()
            .iter()
            .map(RecipeDocument::from_record)
            .collect();
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await.unwrap();

        store
            .replace_all(
                documents
                    .into_iter()
                    .zip(embeddings)
                    .map(|(document, embedding)| EmbeddedDocument { document, embedding })
                    .collect(),
            )
            .await
            .unwrap();
        embedder.texts.lock().unwrap().clear();
    }

    let ctx = RagContext::new(embedder.clone(), store.clone(), llm.clone(), "llama3.2:3b").unwrap();

    Harness {
        ctx,
        embedder,
        store,
        llm,
    }
}

fn content_of(id: &RecipeId) -> String {
    let record = parse_dataset(DATASET)
        .unwrap()
        .into_iter()
        .find(|r| &r.id == id)
        .unwrap();
    RecipeDocument::from_record(&record).content
}

#[tokio::test]
async fn test_keyword_question_uses_keyword_tier() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;

    let response = chat(&h.ctx, "Cho tôi công thức phở bò").await.unwrap();

    assert_eq!(h.embedder.last_text().as_deref(), Some("phở bò"));
    assert_eq!(h.store.last_top_k(), Some(3));
    assert_eq!(
        response.tier,
        RetrievalTier::Keyword {
            keyword: "phở bò".to_string(),
            category: Some("phở".to_string()),
        }
    );
    assert!(response.sources.len() <= 3);
    assert_eq!(response.sources[0].title, "Phở bò");
    assert_eq!(response.sources[0].id, RecipeId::Int(1));
    assert_eq!(response.answer, "Câu trả lời mẫu");
}

#[tokio::test]
async fn test_keyword_tier_never_searches_the_question() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;

    chat(&h.ctx, "Bún chả nấu thế nào cho ngon?").await.unwrap();

    let texts = h.embedder.texts.lock().unwrap().clone();
    assert_eq!(texts, vec!["bún chả".to_string()]);
    assert_eq!(h.store.top_ks.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_question_without_keyword_uses_semantic_tier() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;
    let question = "Món canh chua cá lóc nấu thế nào?";

    let response = chat(&h.ctx, question).await.unwrap();

    assert_eq!(response.tier, RetrievalTier::Semantic);
    assert_eq!(h.embedder.last_text().as_deref(), Some(question));
    assert_eq!(h.store.last_top_k(), Some(5));
    assert_eq!(response.sources.len(), 5);
    assert_eq!(response.sources[0].id, RecipeId::from("canh-chua"));
}

#[tokio::test]
async fn test_context_is_exactly_the_top_candidate() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;

    let response = chat(&h.ctx, "Cho tôi công thức phở bò").await.unwrap();

    let top = content_of(&response.sources[0].id);
    let second = content_of(&response.sources[1].id);
    assert_eq!(response.context, top);

    let request = h.llm.last_request().unwrap();
    assert!(request.prompt.contains(&top));
    assert!(!request.prompt.contains(&second));
}

#[tokio::test]
async fn test_prompt_layout_and_generation_settings() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;

    chat(&h.ctx, "Cho tôi công thức phở bò").await.unwrap();

    let request = h.llm.last_request().unwrap();
    let expected = format!(
        "Dựa vào công thức sau, trả lời đầy đủ. KHÔNG thêm thông tin khác.\n\nCông thức:\n{}\n\nCâu hỏi: Cho tôi công thức phở bò\n\nTrả lời:",
        content_of(&RecipeId::Int(1))
    );
    assert_eq!(request.prompt, expected);
    assert_eq!(request.model, "llama3.2:3b");
    assert_eq!(request.max_tokens, Some(500));
    assert!(request.system.is_none());
}

#[tokio::test]
async fn test_empty_store_uses_sentinel_and_still_calls_model() {
    let h = harness(RecordingLlm::default(), None).await;

    let response = chat(&h.ctx, "Cho tôi công thức phở bò").await.unwrap();

    assert!(response.sources.is_empty());
    assert_eq!(response.context, SENTINEL);
    assert_eq!(h.llm.calls(), 1);
    assert!(h.llm.last_request().unwrap().prompt.contains(SENTINEL));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["sources"], serde_json::json!([]));
}

#[tokio::test]
async fn test_blank_question_is_rejected_before_any_call() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;

    let err = chat(&h.ctx, "   ").await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.is_client_error());
    assert!(h.embedder.texts.lock().unwrap().is_empty());
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_llm_failure_propagates() {
    let h = harness(RecordingLlm::failing(), Some(DATASET)).await;

    let err = chat(&h.ctx, "Cho tôi công thức gà rán").await.unwrap_err();

    assert!(matches!(err, AppError::Llm(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_configured_keywords_and_top_k() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;
    let ctx = h.ctx.clone().with_retrieval(RetrievalConfig {
        keywords: vec![KeywordRule::new("gỏi cuốn", "gỏi")],
        keyword_top_k: 1,
        ..Default::default()
    });

    let response = chat(&ctx, "Gỏi cuốn chấm nước gì?").await.unwrap();
    assert_eq!(h.embedder.last_text().as_deref(), Some("gỏi cuốn"));
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].id, RecipeId::from("goi-cuon"));

    // "phở bò" is no longer a keyword
    chat(&ctx, "Cho tôi công thức phở bò").await.unwrap();
    assert_eq!(h.store.last_top_k(), Some(5));
}

#[tokio::test]
async fn test_generation_overrides() {
    let h = harness(RecordingLlm::default(), Some(DATASET)).await;
    let ctx = h.ctx.clone().with_generation(GenerationConfig {
        max_tokens: 128,
        temperature: Some(0.2),
        ..Default::default()
    });

    chat(&ctx, "Cho tôi công thức bánh mì").await.unwrap();

    let request = h.llm.last_request().unwrap();
    assert_eq!(request.max_tokens, Some(128));
    assert_eq!(request.temperature, Some(0.2));
}

#[tokio::test]
async fn test_custom_prompt_must_reference_both_variables() {
    let h = harness(RecordingLlm::default(), None).await;

    let incomplete = PromptDefinition {
        id: "recipe.short".to_string(),
        title: "Short".to_string(),
        api_version: "1.0".to_string(),
        created_by: "test".to_string(),
        variables: vec![],
        system: None,
        template: "Q: {{question}}".to_string(),
    };
    assert!(h.ctx.clone().with_prompt(incomplete).is_err());

    let complete = PromptDefinition {
        id: "recipe.short".to_string(),
        title: "Short".to_string(),
        api_version: "1.0".to_string(),
        created_by: "test".to_string(),
        variables: vec!["context".to_string(), "question".to_string()],
        system: Some("Trả lời ngắn gọn.".to_string()),
        template: "R: {{context}} / Q: {{question}}".to_string(),
    };
    let ctx = h.ctx.clone().with_prompt(complete).unwrap();

    chat(&ctx, "Món gì cũng được").await.unwrap();
    let request = h.llm.last_request().unwrap();
    assert_eq!(request.prompt, format!("R: {} / Q: Món gì cũng được", SENTINEL));
    assert_eq!(request.system.as_deref(), Some("Trả lời ngắn gọn."));
}
