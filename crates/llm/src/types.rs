//! Provider and model identifier types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Ollama,
    OpenRouter,
    Groq,
    HuggingFace,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            "openrouter" => Some(Self::OpenRouter),
            "groq" => Some(Self::Groq),
            "huggingface" | "hf" => Some(Self::HuggingFace),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
            Self::OpenRouter => "openrouter",
            Self::Groq => "groq",
            Self::HuggingFace => "huggingface",
        }
    }

    /// Base URL used when no endpoint is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::HuggingFace => "https://router.huggingface.co/v1",
        }
    }

    /// Environment variable conventionally holding this provider's key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::HuggingFace => Some("HF_TOKEN"),
        }
    }
}

/// A model identifier split into its routing provider and provider-side name.
///
/// `ollama/deepseek-r1` routes to Ollama with model `deepseek-r1`. Ids without a
/// recognized prefix (including ones containing `/`) route to OpenAI unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: ProviderType,
    pub name: String,
}

impl ModelId {
    pub fn parse(id: &str) -> Self {
        if let Some((prefix, rest)) = id.split_once('/') {
            if let Some(provider) = ProviderType::parse(prefix) {
                if !rest.is_empty() {
                    return Self {
                        provider,
                        name: rest.to_string(),
                    };
                }
            }
        }

        Self {
            provider: ProviderType::OpenAI,
            name: id.to_string(),
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider.as_str(), self.name)
    }
}

/// Connection settings for building a provider client.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Custom base URL; falls back to the provider default
    pub endpoint: Option<String>,

    /// Bearer token
    pub api_key: Option<String>,

    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,

    /// HTTP timeout in seconds
    pub timeout: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("openai"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::parse("Ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("openrouter"), Some(ProviderType::OpenRouter));
        assert_eq!(ProviderType::parse("groq"), Some(ProviderType::Groq));
        assert_eq!(ProviderType::parse("hf"), Some(ProviderType::HuggingFace));
        assert_eq!(ProviderType::parse("unknown"), None);
    }

    #[test]
    fn test_model_id_with_prefix() {
        let id = ModelId::parse("ollama/deepseek-r1:7b");
        assert_eq!(id.provider, ProviderType::Ollama);
        assert_eq!(id.name, "deepseek-r1:7b");
    }

    #[test]
    fn test_model_id_keeps_nested_path() {
        let id = ModelId::parse("openrouter/deepseek/deepseek-r1");
        assert_eq!(id.provider, ProviderType::OpenRouter);
        assert_eq!(id.name, "deepseek/deepseek-r1");
    }

    #[test]
    fn test_model_id_without_prefix() {
        let id = ModelId::parse("gpt-4o-mini");
        assert_eq!(id.provider, ProviderType::OpenAI);
        assert_eq!(id.name, "gpt-4o-mini");

        let id = ModelId::parse("meta-llama/Llama-3.1-8B");
        assert_eq!(id.provider, ProviderType::OpenAI);
        assert_eq!(id.name, "meta-llama/Llama-3.1-8B");
    }

    #[test]
    fn test_model_id_display() {
        assert_eq!(ModelId::parse("groq/llama3").to_string(), "groq/llama3");
    }
}
