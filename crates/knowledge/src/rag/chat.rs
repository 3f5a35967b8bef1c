//! Question answering orchestration.

use crate::rag::answer::{generate_answer, select_context, to_sources};
use crate::rag::context::RagContext;
use crate::rag::retrieval::retrieve;
use crate::rag::types::ChatResponse;
use cookbook_core::{AppError, AppResult};

/// Answer a question from the recipe store.
///
/// This function:
/// 1. Rejects blank questions
/// 2. Retrieves candidates (keyword tier, else semantic tier)
/// 3. Uses the top candidate as context, or the not-found sentinel
/// 4. Asks the model with the answer prompt
///
/// The model is called even when nothing was found; `sources` is then empty.
pub async fn chat(ctx: &RagContext, question: &str) -> AppResult<ChatResponse> {
    if question.trim().is_empty() {
        return Err(AppError::Validation("Question must not be empty".to_string()));
    }

    tracing::info!("Answering question: {}", question);

    let retrieval = retrieve(
        question,
        ctx.embedder.as_ref(),
        ctx.store.as_ref(),
        &ctx.retrieval,
    )
    .await?;

    let context = select_context(&retrieval.candidates, &ctx.retrieval.not_found_context);
    if retrieval.candidates.is_empty() {
        tracing::info!("No matching recipe, answering with the not-found context");
    }

    let answer = generate_answer(
        ctx.llm.as_ref(),
        &ctx.model,
        &ctx.prompt,
        &ctx.generation,
        question,
        context,
    )
    .await?;

    let sources = to_sources(&retrieval.candidates);

    tracing::info!(
        tier = retrieval.tier.label(),
        sources = sources.len(),
        answer_len = answer.len(),
        "Answer generated"
    );

    Ok(ChatResponse {
        answer,
        sources,
        context: context.to_string(),
        tier: retrieval.tier,
    })
}
