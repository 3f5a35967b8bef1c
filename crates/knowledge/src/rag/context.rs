//! Process-scoped collaborators for answering questions.

use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::open_store;
use crate::vector_store::VectorStore;
use cookbook_core::config::{GenerationConfig, RetrievalConfig};
use cookbook_core::{AppConfig, AppResult};
use cookbook_llm::{create_client, LlmClient};
use cookbook_prompt::{
    builtin_prompt, load_or_builtin, require_variables, PromptDefinition, ANSWER_PROMPT_ID,
};
use std::sync::Arc;

/// Variables the answer prompt must reference.
pub const PROMPT_VARIABLES: &[&str] = &["context", "question"];

/// Everything a question needs: built once, then shared by every request.
#[derive(Clone)]
pub struct RagContext {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn VectorStore>,
    pub llm: Arc<dyn LlmClient>,

    /// Model name sent with each completion request
    pub model: String,

    pub prompt: PromptDefinition,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
}

impl RagContext {
    /// Assemble a context with default retrieval settings and the built-in prompt.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            embedder,
            store,
            llm,
            model: model.into(),
            prompt: builtin_prompt(ANSWER_PROMPT_ID)?,
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
        })
    }

    /// Build every collaborator from configuration.
    ///
    /// Nothing is contacted here; Ollama and the store are first used by
    /// the first question.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let embedder = create_provider(&config.embedding, &config.embedding_endpoint())?;
        let store = open_store(config);

        let provider = config.active_provider()?;
        let llm = create_client(&config.llm.active_provider, provider)?;

        let prompt = load_or_builtin(&config.workspace, &config.generation.prompt_id)?;

        tracing::info!(
            llm = llm.provider_name(),
            model = %provider.model,
            embedding_model = embedder.model_name(),
            store = ?config.store_path(),
            prompt = %prompt.id,
            "RAG context ready"
        );

        Ok(Self::new(embedder, store, llm, provider.model.clone())?
            .with_prompt(prompt)?
            .with_retrieval(config.retrieval.clone())
            .with_generation(config.generation.clone()))
    }

    /// Replace the answer prompt. It must reference `{{context}}` and `{{question}}`.
    pub fn with_prompt(mut self, prompt: PromptDefinition) -> AppResult<Self> {
        require_variables(&prompt, PROMPT_VARIABLES)?;
        self.prompt = prompt;
        Ok(self)
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

impl std::fmt::Debug for RagContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagContext")
            .field("embedder", &self.embedder)
            .field("store", &self.store.backend_name())
            .field("llm", &self.llm.provider_name())
            .field("model", &self.model)
            .field("prompt", &self.prompt.id)
            .finish()
    }
}
