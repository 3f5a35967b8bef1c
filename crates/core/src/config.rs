//! Configuration management for the cookbook RAG service.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults
//! - Config file (`.cookbook/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The keyword list and the prompt id used by the query pipeline live here so
//! they can be replaced without touching behavior code.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".cookbook";

/// Providers the LLM factory knows how to build.
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["ollama"];

/// Providers the embedding factory knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: &[&str] = &["ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .cookbook/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Language model providers
    pub llm: LlmConfig,

    /// Embedding function used by both ingestion and queries
    pub embedding: EmbeddingConfig,

    /// Vector store location
    pub store: StoreConfig,

    /// Two-tier retrieval policy
    pub retrieval: RetrievalConfig,

    /// Answer generation settings
    pub generation: GenerationConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert("ollama".to_string(), ProviderConfig::default());

        Self {
            active_provider: "ollama".to_string(),
            providers,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub endpoint: String,

    pub model: String,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: "llama3.2:3b".to_string(),
            timeout: Some(120),
        }
    }
}

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Embedding provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Endpoint override; falls back to the Ollama LLM endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "mxbai-embed-large".to_string(),
            dimensions: 1024,
            endpoint: None,
            timeout: 30,
        }
    }
}

/// Vector store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Store directory; relative paths resolve against the workspace
    pub path: PathBuf,

    /// Table holding the recipe documents
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("recipes_db"),
            table: "recipes".to_string(),
        }
    }
}

/// A canonical dish name that triggers the keyword tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl KeywordRule {
    pub fn new(keyword: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category: Some(category.into()),
        }
    }
}

/// Two-tier retrieval policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Ordered keyword list; the first entry contained in the question wins
    pub keywords: Vec<KeywordRule>,

    /// Results requested when a keyword matched
    pub keyword_top_k: usize,

    /// Results requested for the semantic fallback
    pub semantic_top_k: usize,

    /// Context used when no candidate document was found
    pub not_found_context: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                KeywordRule::new("phở bò", "phở"),
                KeywordRule::new("phở gà", "phở"),
                KeywordRule::new("cơm chiên", "cơm"),
                KeywordRule::new("bánh mì", "bánh"),
                KeywordRule::new("bún chả", "bún"),
                KeywordRule::new("gà rán", "gà"),
            ],
            keyword_top_k: 3,
            semantic_top_k: 5,
            not_found_context: "Không tìm thấy món phù hợp.".to_string(),
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Cap on generated tokens
    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Prompt definition id (`.cookbook/prompts/<id>.yml`)
    pub prompt_id: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: None,
            prompt_id: "recipe.answer".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Upper bound for one chat request; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
            request_timeout_secs: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    embedding: Option<EmbeddingConfig>,
    store: Option<StoreConfig>,
    retrieval: Option<RetrievalConfig>,
    generation: Option<GenerationConfig>,
    server: Option<ServerConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `COOKBOOK_WORKSPACE`: Override workspace path
    /// - `COOKBOOK_CONFIG`: Path to config file
    /// - `COOKBOOK_MODEL`: Generation model for the active provider
    /// - `COOKBOOK_EMBEDDING_MODEL`: Embedding model
    /// - `OLLAMA_URL`: Ollama endpoint for generation and embeddings
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use cookbook_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Store: {:?}", config.store_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit arguments win over `COOKBOOK_WORKSPACE` / `COOKBOOK_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_var("COOKBOOK_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_var("COOKBOOK_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.cookbook_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env(env_var);

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(store) = config_file.store {
            result.store = store;
        }
        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }
        if let Some(server) = config_file.server {
            result.server = server;
        }

        Ok(result)
    }

    /// Apply environment overrides using the given lookup.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("COOKBOOK_MODEL") {
            if let Some(provider) = self.llm.providers.get_mut(&self.llm.active_provider) {
                provider.model = model;
            }
        }

        if let Some(model) = lookup("COOKBOOK_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Some(url) = lookup("OLLAMA_URL") {
            if let Some(provider) = self.llm.providers.get_mut("ollama") {
                provider.endpoint = url.clone();
            }
            if self.embedding.provider == "ollama" {
                self.embedding.endpoint = Some(url);
            }
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            if let Some(provider) = self.llm.providers.get_mut(&self.llm.active_provider) {
                provider.model = model;
            }
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .cookbook directory.
    pub fn cookbook_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Ensure the .cookbook directory exists.
    pub fn ensure_cookbook_dir(&self) -> AppResult<()> {
        let dir = self.cookbook_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create {} directory: {}", STATE_DIR, e))
            })?;
        }
        Ok(())
    }

    /// Resolved vector store directory.
    pub fn store_path(&self) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            self.workspace.join(&self.store.path)
        }
    }

    /// Get the active LLM provider configuration.
    pub fn active_provider(&self) -> AppResult<&ProviderConfig> {
        self.llm
            .providers
            .get(&self.llm.active_provider)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "No configuration for active provider '{}'",
                    self.llm.active_provider
                ))
            })
    }

    /// Endpoint used for embeddings.
    pub fn embedding_endpoint(&self) -> String {
        self.embedding
            .endpoint
            .clone()
            .or_else(|| self.llm.providers.get("ollama").map(|p| p.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
    }

    /// Validate configuration before building any collaborator.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.llm.active_provider;
        if !KNOWN_LLM_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }
        self.active_provider()?;

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.retrieval.keyword_top_k == 0 || self.retrieval.semantic_top_k == 0 {
            return Err(AppError::Config(
                "Retrieval top-k values must be greater than zero".to_string(),
            ));
        }

        if let Some(rule) = self
            .retrieval
            .keywords
            .iter()
            .find(|rule| rule.keyword.trim().is_empty())
        {
            return Err(AppError::Config(format!(
                "Keyword rule with empty keyword (category: {:?})",
                rule.category
            )));
        }

        if self.generation.max_tokens == 0 {
            return Err(AppError::Config(
                "generation.maxTokens must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
