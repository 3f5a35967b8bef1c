//! Context selection and answer generation.

use crate::rag::types::SourceRef;
use crate::vector_store::ScoredDocument;
use cookbook_core::config::GenerationConfig;
use cookbook_core::AppResult;
use cookbook_llm::{LlmClient, LlmRequest};
use cookbook_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;

/// Content of the top candidate, or `not_found` when there is none.
///
/// Only one recipe is ever shown to the model.
pub fn select_context<'a>(candidates: &'a [ScoredDocument], not_found: &'a str) -> &'a str {
    candidates
        .first()
        .map(|c| c.document.content.as_str())
        .unwrap_or(not_found)
}

/// One source per candidate, in rank order.
pub fn to_sources(candidates: &[ScoredDocument]) -> Vec<SourceRef> {
    candidates
        .iter()
        .map(|c| SourceRef {
            title: c.document.metadata.title.clone(),
            id: c.document.metadata.id.clone(),
        })
        .collect()
}

/// Render the answer prompt and ask the model.
pub async fn generate_answer(
    llm: &dyn LlmClient,
    model: &str,
    prompt: &PromptDefinition,
    generation: &GenerationConfig,
    question: &str,
    context: &str,
) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());
    variables.insert("question".to_string(), question.to_string());

    let built = build_prompt(prompt, variables)?;

    let mut request = LlmRequest::new(built.user, model).with_max_tokens(generation.max_tokens);
    if let Some(temperature) = generation.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(system) = built.system {
        request = request.with_system(system);
    }

    tracing::debug!(
        provider = llm.provider_name(),
        model,
        max_tokens = generation.max_tokens,
        "Generating answer"
    );

    let response = llm.complete(&request).await?;
    Ok(response.content)
}
