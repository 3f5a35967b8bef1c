//! LLM provider factory.
//!
//! Builds an [`LlmClient`] from the configured provider name.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use cookbook_core::config::ProviderConfig;
use cookbook_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier (currently only "ollama")
/// * `config` - Endpoint and timeout for the provider
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the HTTP client
/// cannot be built.
pub fn create_client(provider: &str, config: &ProviderConfig) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let timeout = config.timeout.map(Duration::from_secs);
            let client = OllamaClient::with_options(&config.endpoint, timeout)?;
            tracing::debug!(
                "Created Ollama client at {} (timeout: {:?})",
                config.endpoint,
                timeout
            );
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", &ProviderConfig::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let config = ProviderConfig {
            endpoint: "http://localhost:8080".to_string(),
            timeout: None,
            ..Default::default()
        };
        assert!(create_client("Ollama", &config).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", &ProviderConfig::default()) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
