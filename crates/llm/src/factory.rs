//! LLM provider factory.
//!
//! Builds a concrete client for the provider a model identifier routes to.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiCompatibleClient};
use crate::types::{ProviderSettings, ProviderType};
use reag_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client for `provider`.
///
/// Hosted providers require `settings.api_key`; callers resolve it from the
/// environment beforehand. Ollama needs no key.
///
/// # Errors
/// Returns `AppError::Config` if a required key is missing or the HTTP client
/// cannot be built.
pub fn create_client(
    provider: ProviderType,
    settings: &ProviderSettings,
) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = settings
        .endpoint
        .as_deref()
        .unwrap_or_else(|| provider.default_endpoint());

    tracing::debug!(provider = provider.as_str(), endpoint, "Creating LLM client");

    match provider {
        ProviderType::Ollama => {
            let client = OllamaClient::with_timeout(endpoint, settings.timeout)?;
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI
        | ProviderType::OpenRouter
        | ProviderType::Groq
        | ProviderType::HuggingFace => {
            let api_key = settings.api_key.as_deref().ok_or_else(|| {
                AppError::Config(format!(
                    "{} provider requires API key{}",
                    provider.as_str(),
                    provider
                        .api_key_env()
                        .map(|var| format!(" (set {})", var))
                        .unwrap_or_default()
                ))
            })?;

            let client = OpenAiCompatibleClient::with_options(
                provider.as_str(),
                endpoint,
                Some(api_key),
                &settings.headers,
                settings.timeout,
            )?;
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> ProviderSettings {
        ProviderSettings {
            api_key: Some("sk-test".to_string()),
            ..ProviderSettings::default()
        }
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client(ProviderType::Ollama, &ProviderSettings::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let settings = ProviderSettings {
            endpoint: Some("http://localhost:8080".to_string()),
            timeout: Some(30),
            ..ProviderSettings::default()
        };
        assert!(create_client(ProviderType::Ollama, &settings).is_ok());
    }

    #[test]
    fn test_create_openai_compatible_clients() {
        for provider in [
            ProviderType::OpenAI,
            ProviderType::OpenRouter,
            ProviderType::Groq,
            ProviderType::HuggingFace,
        ] {
            let client = create_client(provider, &with_key()).unwrap();
            assert_eq!(client.provider_name(), provider.as_str());
        }
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client(ProviderType::OpenAI, &ProviderSettings::default()) {
            Err(err) => assert!(err.to_string().contains("openai provider requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut settings = with_key();
        settings
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(create_client(ProviderType::OpenRouter, &settings).is_err());
    }
}
