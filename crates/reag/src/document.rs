//! Documents and their metadata.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A metadata value: either a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Order two values of the same type; `None` across types.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for MetadataValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

/// Metadata mapping, kept sorted so prompts serialize deterministically.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A named unit of content, the unit of relevance judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            metadata: None,
        }
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }

    /// Render the document the way it is embedded in the system prompt.
    ///
    /// ```text
    /// Name: <name>
    /// Metadata: <JSON object, or null>
    /// Content: <content>
    /// ```
    pub fn to_prompt_section(&self) -> String {
        let metadata = serde_json::to_string(&self.metadata).unwrap_or_else(|_| "null".to_string());
        format!(
            "Name: {}\nMetadata: {}\nContent: {}",
            self.name, metadata, self.content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_section_with_metadata() {
        let doc = Document::new("Superagent", "A workspace for AI-agents.")
            .with_metadata("url", "https://superagent.sh")
            .with_metadata("version", 2);

        assert_eq!(
            doc.to_prompt_section(),
            "Name: Superagent\nMetadata: {\"url\":\"https://superagent.sh\",\"version\":2}\nContent: A workspace for AI-agents."
        );
    }

    #[test]
    fn test_prompt_section_without_metadata() {
        let doc = Document::new("Plain", "text");
        assert_eq!(doc.to_prompt_section(), "Name: Plain\nMetadata: null\nContent: text");
    }

    #[test]
    fn test_metadata_values_deserialize_untagged() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "name": "d",
            "content": "c",
            "metadata": {"id": "sa-1", "version": 3}
        }))
        .unwrap();

        assert_eq!(doc.metadata_value("id"), Some(&MetadataValue::Text("sa-1".into())));
        assert_eq!(doc.metadata_value("version"), Some(&MetadataValue::Integer(3)));
        assert_eq!(doc.metadata_value("missing"), None);
    }

    #[test]
    fn test_compare_same_type_only() {
        let one = MetadataValue::from(1);
        let two = MetadataValue::from(2);
        assert_eq!(one.compare(&two), Some(Ordering::Less));
        assert_eq!(MetadataValue::from("b").compare(&"a".into()), Some(Ordering::Greater));
        assert_eq!(one.compare(&MetadataValue::from("1")), None);
    }
}
