//! Pipeline tests against a scripted backend.


use crate::{Document, ReagClient};
use reag_llm::MockLlmClient;
use std::sync::Arc;

/// Structured body the way a JSON-mode backend answers.
fn source_json(content: &str, is_irrelevant: bool) -> String {
    serde_json::json!({
        "source": {
            "content": content,
            "reasoning": "The document describes Superagent.",
            "is_irrelevant": is_irrelevant,
        }
    })
    .to_string()
}

fn superagent(id: &str) -> Document {
    Document::new(
        "Superagent",
        "Superagent is a workspace for AI-agents that learn, perform work, and collaborate.",
    )
    .with_metadata("url", "https://superagent.sh")
    .with_metadata("source", "web")
    .with_metadata("id", id)
}

fn client_with(mock: &Arc<MockLlmClient>) -> ReagClient {
    ReagClient::builder()
        .llm_client(mock.clone())
        .build()
        .unwrap()
}
