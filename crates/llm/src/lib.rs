//! Chat-completion backends for ReAG.
//!
//! This crate provides a provider-agnostic abstraction over hosted and local
//! chat-completion APIs behind the [`LlmClient`] trait.
//!
//! # Providers
//! - **OpenAI-compatible**: OpenAI, OpenRouter, Groq, Hugging Face router
//! - **Ollama**: Local LLM runtime
//! - **Mock**: Scripted responses for tests
//!
//! # Example
//! ```no_run
//! use reag_llm::{ChatMessage, LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("llama3.2", vec![ChatMessage::user("Hello, world!")]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage, Role,
};
pub use factory::create_client;
pub use providers::{MockLlmClient, OllamaClient, OpenAiCompatibleClient};
pub use types::{ModelId, ProviderSettings, ProviderType};
