//! LLM integration crate for the cookbook RAG service.
//!
//! This crate provides a provider-agnostic abstraction for text completion.
//! The query pipeline only depends on the [`LlmClient`] trait, so tests can
//! substitute a recording client for the real backend.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//!
//! # Example
//! ```no_run
//! use cookbook_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::with_options("http://localhost:11434", None)?;
//! let request = LlmRequest::new("Phở bò gồm những gì?", "llama3.2:3b").with_max_tokens(500);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OllamaClient;
