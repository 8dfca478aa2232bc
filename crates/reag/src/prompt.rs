//! Instruction prompts and the structured response schema.

use crate::document::Document;
use crate::parser::ResponseStyle;

/// Default instructions for backends answering with the JSON `source` object.
pub const REAG_SYSTEM_PROMPT: &str = r#"You are a retrieval assistant. You are given one source document and a question from the user.

1. Decide whether the source contains information that helps answer the question.
2. If it does, answer the question using only that source. Be complete but concise.
3. Explain briefly how the source supports your answer, or why it does not.

Respond with a JSON object of this exact shape and nothing else:
{"source": {"content": "<answer, empty if irrelevant>", "reasoning": "<short explanation>", "is_irrelevant": <true|false>}}"#;

/// Default instructions for thinking models answering in free text.
pub const REAG_REASONING_SYSTEM_PROMPT: &str = r#"You are a retrieval assistant. You are given one source document and a question from the user.

Think about whether the source contains information that helps answer the question, then answer using only that source.

After your thinking, reply with exactly these two lines:
**isIrrelevant:** <true if the source does not help answer the question, otherwise false>
**Answer:** <your answer on a single line, empty if the source is irrelevant>"#;

/// Instruction prompt used when none is configured.
pub fn default_system_prompt(style: ResponseStyle) -> &'static str {
    match style {
        ResponseStyle::Structured => REAG_SYSTEM_PROMPT,
        ResponseStyle::Reasoning => REAG_REASONING_SYSTEM_PROMPT,
    }
}

/// `response_format` asking for the JSON `source` object.
pub fn default_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": "source",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "source": {
                        "type": "object",
                        "properties": {
                            "content": {"type": "string"},
                            "reasoning": {"type": "string"},
                            "is_irrelevant": {"type": "boolean"}
                        },
                        "required": ["content", "reasoning", "is_irrelevant"],
                        "additionalProperties": false
                    }
                },
                "required": ["source"],
                "additionalProperties": false
            }
        }
    })
}

/// System message for one document: instructions, then the document itself.
pub fn build_system_prompt(instructions: &str, document: &Document) -> String {
    format!(
        "{}\n\n# Available source\n\n{}",
        instructions,
        document.to_prompt_section()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_prompt() {
        let doc = Document::new("Superagent", "Superagent is a workspace for AI-agents.")
            .with_metadata("source", "web");
        let prompt = build_system_prompt("Judge the source.", &doc);

        assert_eq!(
            prompt,
            "Judge the source.\n\n# Available source\n\nName: Superagent\nMetadata: {\"source\":\"web\"}\nContent: Superagent is a workspace for AI-agents."
        );
    }

    #[test]
    fn test_default_prompt_follows_style() {
        assert!(default_system_prompt(ResponseStyle::Structured).contains("is_irrelevant"));
        assert!(default_system_prompt(ResponseStyle::Reasoning).contains("**isIrrelevant:**"));
    }

    #[test]
    fn test_schema_names_source_fields() {
        let schema = default_schema();
        let required = &schema["json_schema"]["schema"]["properties"]["source"]["required"];
        assert_eq!(
            required,
            &serde_json::json!(["content", "reasoning", "is_irrelevant"])
        );
    }
}
