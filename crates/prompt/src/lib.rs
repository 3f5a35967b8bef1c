//! Prompt system for the cookbook RAG service.
//!
//! Prompts are YAML definitions rendered with Handlebars. The answer prompt
//! ships built in and can be replaced per workspace by dropping a file in
//! `.cookbook/prompts/<id>.yml`.

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    builtin_prompt, load_or_builtin, load_prompt, require_variables, ANSWER_PROMPT_ID,
};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
