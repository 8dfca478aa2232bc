//! Model response parsing.
//!
//! Two response styles are supported, chosen once per client:
//!
//! **Structured**: the body is a JSON object:
//! ```text
//! {"source": {"content": "<answer>", "reasoning": "<why>", "is_irrelevant": false}}
//! ```
//! Missing fields default to empty strings and `is_irrelevant = true`. A body
//! wrapped in a Markdown code fence is unwrapped first.
//!
//! **Reasoning**: free text from a thinking model:
//! ```text
//! <think> ... </think>
//! **isIrrelevant:** true|false
//! **Answer:** <text up to the next newline or end of input>
//! ```
//! The think block becomes the reasoning; the markers are looked up in the
//! remaining text. Absent markers default to `is_irrelevant = true` and an
//! empty answer. This style never fails.

use reag_core::{AppError, AppResult};
use reag_llm::ProviderType;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>(.*?)</think>").expect("think pattern is valid"));

static IRRELEVANT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*isIrrelevant:\*\*\s*(true|false)").expect("marker pattern is valid")
});

static ANSWER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\*\*Answer:\*\*\s*(.*?)(?:\n|$)").expect("answer pattern is valid")
});

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*\n(.*?)\n?```$").expect("fence pattern is valid")
});

/// How a backend phrases its answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseStyle {
    /// JSON `source` object, requested through a response schema
    #[default]
    Structured,
    /// Think block plus bolded markers
    Reasoning,
}

impl ResponseStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "structured" => Some(Self::Structured),
            "reasoning" => Some(Self::Reasoning),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Reasoning => "reasoning",
        }
    }

    /// Style a provider's models answer in unless configured otherwise.
    pub fn for_provider(provider: ProviderType) -> Self {
        match provider {
            ProviderType::Ollama => Self::Reasoning,
            ProviderType::OpenAI
            | ProviderType::OpenRouter
            | ProviderType::Groq
            | ProviderType::HuggingFace => Self::Structured,
        }
    }

    /// Parse a completion body in this style.
    ///
    /// # Errors
    /// `AppError::Serialization` when a structured body is not valid JSON of
    /// the expected shape.
    pub fn parse_response(&self, body: &str) -> AppResult<ParsedResponse> {
        match self {
            Self::Structured => parse_structured(body),
            Self::Reasoning => Ok(parse_reasoning(body)),
        }
    }
}

/// Relevance judgment and answer extracted from one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub content: String,
    pub reasoning: String,
    pub is_irrelevant: bool,
}

#[derive(Debug, Default, Deserialize)]
struct SourceEnvelope {
    #[serde(default)]
    source: Option<SourcePayload>,
}

#[derive(Debug, Default, Deserialize)]
struct SourcePayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    is_irrelevant: Option<bool>,
}

/// Parse a structured JSON body.
pub fn parse_structured(body: &str) -> AppResult<ParsedResponse> {
    let json = strip_code_fence(body.trim());
    let envelope: SourceEnvelope = serde_json::from_str(json)
        .map_err(|e| AppError::Serialization(format!("Could not parse response: {}", e)))?;
    let source = envelope.source.unwrap_or_default();

    Ok(ParsedResponse {
        content: source.content.unwrap_or_default(),
        reasoning: source.reasoning.unwrap_or_default(),
        is_irrelevant: source.is_irrelevant.unwrap_or(true),
    })
}

/// Parse a reasoning-model text body.
pub fn parse_reasoning(body: &str) -> ParsedResponse {
    let reasoning = THINK_BLOCK
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let remaining = THINK_BLOCK.replace_all(body, "");
    let remaining = remaining.trim();

    let is_irrelevant = IRRELEVANT_MARKER
        .captures(remaining)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().eq_ignore_ascii_case("true"))
        .unwrap_or(true);

    let content = ANSWER_MARKER
        .captures(remaining)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    ParsedResponse {
        content,
        reasoning,
        is_irrelevant,
    }
}

fn strip_code_fence(body: &str) -> &str {
    CODE_FENCE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_relevant() {
        let parsed = parse_structured(
            r#"{"source":{"content":"Superagent is a workspace for AI-agents.","reasoning":"The document describes Superagent.","is_irrelevant":false}}"#,
        )
        .unwrap();

        assert_eq!(parsed.content, "Superagent is a workspace for AI-agents.");
        assert_eq!(parsed.reasoning, "The document describes Superagent.");
        assert!(!parsed.is_irrelevant);
    }

    #[test]
    fn test_structured_defaults() {
        let parsed = parse_structured(r#"{"source":{"content":"partial"}}"#).unwrap();
        assert_eq!(parsed.content, "partial");
        assert_eq!(parsed.reasoning, "");
        assert!(parsed.is_irrelevant);

        let empty = parse_structured("{}").unwrap();
        assert!(empty.is_irrelevant);
        assert_eq!(empty.content, "");

        let nulls = parse_structured(r#"{"source":{"content":null,"is_irrelevant":null}}"#).unwrap();
        assert!(nulls.is_irrelevant);
    }

    #[test]
    fn test_structured_malformed() {
        assert!(matches!(
            parse_structured("Superagent is great"),
            Err(AppError::Serialization(_))
        ));
        assert!(parse_structured(r#"{"source": "#).is_err());
    }

    #[test]
    fn test_structured_code_fence() {
        let body = "```json\n{\"source\":{\"content\":\"fenced\",\"is_irrelevant\":false}}\n```";
        let parsed = parse_structured(body).unwrap();
        assert_eq!(parsed.content, "fenced");
        assert!(!parsed.is_irrelevant);
    }

    #[test]
    fn test_reasoning_full() {
        let body = "<think>\nThe source mentions Superagent directly.\n</think>\n\n**isIrrelevant:** false\n**Answer:** Superagent is a workspace for AI-agents.\nExtra trailing text";
        let parsed = parse_reasoning(body);

        assert_eq!(parsed.reasoning, "The source mentions Superagent directly.");
        assert!(!parsed.is_irrelevant);
        assert_eq!(parsed.content, "Superagent is a workspace for AI-agents.");
    }

    #[test]
    fn test_reasoning_marker_case_insensitive() {
        let parsed = parse_reasoning("**ISIRRELEVANT:** FALSE\n**Answer:** yes");
        assert!(!parsed.is_irrelevant);
        assert_eq!(parsed.content, "yes");
        assert_eq!(parsed.reasoning, "");
    }

    #[test]
    fn test_reasoning_answer_at_end_of_input() {
        let parsed = parse_reasoning("<think>x</think>**isIrrelevant:** true **Answer:** none");
        assert!(parsed.is_irrelevant);
        assert_eq!(parsed.content, "none");
    }

    #[test]
    fn test_reasoning_defaults_without_markers() {
        let parsed = parse_reasoning("<think>hmm</think> I am not sure.");
        assert_eq!(parsed.reasoning, "hmm");
        assert!(parsed.is_irrelevant);
        assert_eq!(parsed.content, "");
    }

    #[test]
    fn test_markers_inside_think_are_ignored() {
        let parsed = parse_reasoning("<think>**Answer:** draft</think>**isIrrelevant:** false");
        assert_eq!(parsed.content, "");
        assert!(!parsed.is_irrelevant);
    }

    #[test]
    fn test_style_selection() {
        assert_eq!(ResponseStyle::for_provider(ProviderType::Ollama), ResponseStyle::Reasoning);
        assert_eq!(ResponseStyle::for_provider(ProviderType::OpenAI), ResponseStyle::Structured);
        assert_eq!(ResponseStyle::parse("Reasoning"), Some(ResponseStyle::Reasoning));
        assert_eq!(ResponseStyle::parse("poetic"), None);
        assert_eq!(ResponseStyle::parse("json"), None);

        let parsed = ResponseStyle::Reasoning.parse_response("not json at all").unwrap();
        assert!(parsed.is_irrelevant);
        assert!(ResponseStyle::Structured.parse_response("not json at all").is_err());
    }

    #[test]
    fn test_parse_accepts_exactly_configurable_styles() {
        for name in reag_core::config::KNOWN_RESPONSE_STYLES {
            let style = ResponseStyle::parse(name).unwrap();
            assert_eq!(style.as_str(), name);
        }
    }
}
