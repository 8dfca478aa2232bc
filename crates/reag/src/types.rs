//! Query options and result types.

use crate::document::Document;
use crate::filter::MetadataFilter;
use serde::{Deserialize, Serialize};

/// One filter or a list of filters, as accepted in query options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    Many(Vec<MetadataFilter>),
    One(MetadataFilter),
}

impl FilterSpec {
    pub fn as_slice(&self) -> &[MetadataFilter] {
        match self {
            Self::Many(filters) => filters,
            Self::One(filter) => std::slice::from_ref(filter),
        }
    }
}

/// Per-query options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
}

impl QueryOptions {
    pub fn with_filter(filter: MetadataFilter) -> Self {
        Self {
            filter: Some(FilterSpec::One(filter)),
        }
    }

    pub fn with_filters(filters: Vec<MetadataFilter>) -> Self {
        Self {
            filter: Some(FilterSpec::Many(filters)),
        }
    }

    /// Filters to apply; empty when none were given.
    pub fn filters(&self) -> &[MetadataFilter] {
        self.filter.as_ref().map(FilterSpec::as_slice).unwrap_or(&[])
    }
}

/// Answer extracted from one relevant document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult<'a> {
    pub content: String,
    pub reasoning: String,
    pub is_irrelevant: bool,
    /// The caller's document this answer came from
    pub document: &'a Document,
}

/// One increment of a streamed answer.
///
/// Only `content` is set on chunks; the other fields exist for parity with
/// [`QueryResult`] and stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamingQueryResult {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_irrelevant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

impl StreamingQueryResult {
    pub fn chunk(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_accept_single_filter() {
        let options: QueryOptions = serde_json::from_value(serde_json::json!({
            "filter": {"key": "id", "value": "sa-1", "operator": "equals"}
        }))
        .unwrap();
        assert_eq!(options.filters().len(), 1);
        assert_eq!(options.filters()[0].key, "id");
    }

    #[test]
    fn test_options_accept_filter_list() {
        let options: QueryOptions = serde_json::from_value(serde_json::json!({
            "filter": [
                {"key": "id", "value": "sa-1"},
                {"key": "version", "value": 2, "operator": "greaterThanOrEqual"}
            ]
        }))
        .unwrap();
        assert_eq!(options.filters().len(), 2);
    }

    #[test]
    fn test_default_options_have_no_filters() {
        assert!(QueryOptions::default().filters().is_empty());
    }

    #[test]
    fn test_streaming_chunk_has_content_only() {
        let chunk = StreamingQueryResult::chunk("Super");
        assert_eq!(chunk.content, "Super");
        assert!(chunk.reasoning.is_none());
        assert!(chunk.is_irrelevant.is_none());
        assert!(chunk.document.is_none());
    }
}
