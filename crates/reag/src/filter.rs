//! Metadata filter evaluation.
//!
//! A document passes a filter set only if its metadata satisfies every filter.
//! Evaluation never fails: a missing key, a type mismatch, an invalid regex or
//! an unknown operator is simply a non-match.

use crate::document::{Document, MetadataValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Comparison applied by a [`MetadataFilter`].
///
/// Serialized with the camelCase wire names (`equals`, `greaterThanOrEqual`, ...).
/// Unrecognized names are kept as [`FilterOperator::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Regex => "regex",
            Self::GreaterThan => "greaterThan",
            Self::LessThan => "lessThan",
            Self::GreaterThanOrEqual => "greaterThanOrEqual",
            Self::LessThanOrEqual => "lessThanOrEqual",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            "regex" => Self::Regex,
            "greaterThan" => Self::GreaterThan,
            "lessThan" => Self::LessThan,
            "greaterThanOrEqual" => Self::GreaterThanOrEqual,
            "lessThanOrEqual" => Self::LessThanOrEqual,
            _ => Self::Unknown(name),
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

/// A single predicate over one metadata key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub key: String,
    pub value: MetadataValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
}

impl MetadataFilter {
    /// Equality filter.
    pub fn new(key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            operator: None,
        }
    }

    pub fn with_operator(mut self, operator: impl Into<FilterOperator>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Effective operator; absent means equality.
    pub fn operator(&self) -> FilterOperator {
        self.operator.clone().unwrap_or_default()
    }

    /// Whether `document` satisfies this filter.
    pub fn matches(&self, document: &Document) -> bool {
        CompiledFilter::new(self).matches(document)
    }
}

/// A filter with its regex, if any, compiled once for reuse across documents.
struct CompiledFilter<'f> {
    filter: &'f MetadataFilter,
    operator: FilterOperator,
    /// Anchored pattern; `None` for non-regex operators and invalid patterns
    pattern: Option<Regex>,
}

impl<'f> CompiledFilter<'f> {
    fn new(filter: &'f MetadataFilter) -> Self {
        let operator = filter.operator();
        let pattern = match (&operator, filter.value.as_str()) {
            (FilterOperator::Regex, Some(pattern)) => anchored_regex(pattern),
            _ => None,
        };

        Self {
            filter,
            operator,
            pattern,
        }
    }

    fn matches(&self, document: &Document) -> bool {
        let Some(actual) = document.metadata_value(&self.filter.key) else {
            return false;
        };
        let expected = &self.filter.value;

        match &self.operator {
            FilterOperator::Equals => actual == expected,
            FilterOperator::NotEquals => actual != expected,
            FilterOperator::Contains => text_pair(actual, expected).is_some_and(|(a, e)| a.contains(e)),
            FilterOperator::StartsWith => {
                text_pair(actual, expected).is_some_and(|(a, e)| a.starts_with(e))
            }
            FilterOperator::EndsWith => text_pair(actual, expected).is_some_and(|(a, e)| a.ends_with(e)),
            FilterOperator::Regex => match (&self.pattern, actual.as_str()) {
                (Some(re), Some(a)) => re.is_match(a),
                _ => false,
            },
            FilterOperator::GreaterThan => actual.compare(expected) == Some(Ordering::Greater),
            FilterOperator::LessThan => actual.compare(expected) == Some(Ordering::Less),
            FilterOperator::GreaterThanOrEqual => {
                matches!(actual.compare(expected), Some(Ordering::Greater | Ordering::Equal))
            }
            FilterOperator::LessThanOrEqual => {
                matches!(actual.compare(expected), Some(Ordering::Less | Ordering::Equal))
            }
            FilterOperator::Unknown(name) => {
                tracing::debug!(operator = %name, key = %self.filter.key, "Unknown filter operator, treating as non-match");
                false
            }
        }
    }
}

fn text_pair<'a>(actual: &'a MetadataValue, expected: &'a MetadataValue) -> Option<(&'a str, &'a str)> {
    Some((actual.as_str()?, expected.as_str()?))
}

/// Compile `pattern` anchored at the start of the value (not the end).
fn anchored_regex(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{})", pattern)) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(pattern, "Invalid regex in metadata filter: {}", e);
            None
        }
    }
}

fn compile(filters: &[MetadataFilter]) -> Vec<CompiledFilter<'_>> {
    filters.iter().map(CompiledFilter::new).collect()
}

fn passes(document: &Document, compiled: &[CompiledFilter<'_>]) -> bool {
    compiled.iter().all(|f| f.matches(document))
}

/// True iff `document` satisfies every filter. An empty set always passes.
pub fn evaluate(document: &Document, filters: &[MetadataFilter]) -> bool {
    passes(document, &compile(filters))
}

/// Keep the documents that satisfy every filter, in input order.
pub fn filter_documents<'a>(documents: &'a [Document], filters: &[MetadataFilter]) -> Vec<&'a Document> {
    let compiled = compile(filters);
    documents.iter().filter(|doc| passes(doc, &compiled)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, version: i64) -> Document {
        Document::new("Superagent", "Superagent is a workspace for AI-agents.")
            .with_metadata("id", id)
            .with_metadata("version", version)
            .with_metadata("url", "https://superagent.sh")
    }

    fn filter(key: &str, value: impl Into<MetadataValue>, op: &str) -> MetadataFilter {
        MetadataFilter::new(key, value).with_operator(op)
    }

    #[test]
    fn test_empty_filters_always_pass() {
        assert!(evaluate(&doc("sa-1", 1), &[]));
        assert!(evaluate(&Document::new("bare", "no metadata"), &[]));
    }

    #[test]
    fn test_missing_metadata_or_key_never_matches() {
        let bare = Document::new("bare", "no metadata");
        for op in ["equals", "notEquals", "contains", "greaterThan", "regex"] {
            assert!(!evaluate(&bare, &[filter("id", "sa-1", op)]), "op {}", op);
            assert!(!evaluate(&doc("sa-1", 1), &[filter("missing", "x", op)]), "op {}", op);
        }
    }

    #[test]
    fn test_default_operator_is_equals() {
        let f = MetadataFilter::new("id", "sa-1");
        assert_eq!(f.operator(), FilterOperator::Equals);
        assert!(f.matches(&doc("sa-1", 1)));
        assert!(!f.matches(&doc("sa-2", 1)));
    }

    #[test]
    fn test_string_operators() {
        let d = doc("sa-1", 1);
        assert!(evaluate(&d, &[filter("id", "sa-2", "notEquals")]));
        assert!(evaluate(&d, &[filter("url", "superagent", "contains")]));
        assert!(evaluate(&d, &[filter("url", "https://", "startsWith")]));
        assert!(evaluate(&d, &[filter("url", ".sh", "endsWith")]));
        assert!(!evaluate(&d, &[filter("url", ".com", "endsWith")]));
    }

    #[test]
    fn test_regex_is_anchored_at_start_only() {
        let d = doc("sa-1", 1);
        assert!(evaluate(&d, &[filter("id", r"sa-\d", "regex")]));
        assert!(evaluate(&d, &[filter("url", "https", "regex")]));
        assert!(!evaluate(&d, &[filter("url", "superagent", "regex")]));
        assert!(!evaluate(&d, &[filter("id", "(unclosed", "regex")]));
    }

    #[test]
    fn test_numeric_ordering() {
        let v1 = doc("sa-1", 1);
        let v2 = doc("sa-2", 2);
        let gte = [filter("version", 2, "greaterThanOrEqual")];
        assert!(!evaluate(&v1, &gte));
        assert!(evaluate(&v2, &gte));

        assert!(evaluate(&v2, &[filter("version", 1, "greaterThan")]));
        assert!(evaluate(&v1, &[filter("version", 2, "lessThan")]));
        assert!(evaluate(&v1, &[filter("version", 1, "lessThanOrEqual")]));
        assert!(!evaluate(&v2, &[filter("version", 1, "lessThanOrEqual")]));
    }

    #[test]
    fn test_string_ordering_is_lexicographic() {
        let d = doc("sa-2", 1);
        assert!(evaluate(&d, &[filter("id", "sa-1", "greaterThan")]));
        assert!(evaluate(&d, &[filter("id", "sa-3", "lessThan")]));
    }

    #[test]
    fn test_type_mismatch_is_false_not_error() {
        let d = doc("sa-1", 2);
        assert!(!evaluate(&d, &[filter("version", "2", "equals")]));
        assert!(evaluate(&d, &[filter("version", "2", "notEquals")]));
        assert!(!evaluate(&d, &[filter("version", "2", "contains")]));
        assert!(!evaluate(&d, &[filter("version", "1", "greaterThan")]));
        assert!(!evaluate(&d, &[filter("id", 1, "startsWith")]));
    }

    #[test]
    fn test_unknown_operator_is_non_match() {
        let f = filter("id", "sa-1", "fuzzyEquals");
        assert_eq!(f.operator(), FilterOperator::Unknown("fuzzyEquals".to_string()));
        assert!(!f.matches(&doc("sa-1", 1)));
    }

    #[test]
    fn test_all_filters_must_hold() {
        let d = doc("sa-1", 2);
        let both = [filter("id", "sa-1", "equals"), filter("version", 2, "equals")];
        let one_fails = [filter("id", "sa-1", "equals"), filter("version", 3, "equals")];
        assert!(evaluate(&d, &both));
        assert!(!evaluate(&d, &one_fails));
    }

    #[test]
    fn test_filter_documents_preserves_order() {
        let docs = vec![doc("sa-1", 1), doc("sa-2", 2), doc("sa-3", 3)];
        let kept = filter_documents(&docs, &[filter("version", 2, "greaterThanOrEqual")]);
        let ids: Vec<_> = kept
            .iter()
            .map(|d| d.metadata_value("id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["sa-2", "sa-3"]);
    }

    #[test]
    fn test_regex_compiled_once_per_filter() {
        let by_id = filter("id", r"sa-[12]", "regex");
        let compiled = CompiledFilter::new(&by_id);
        assert_eq!(compiled.pattern.as_ref().map(Regex::as_str), Some(r"^(?:sa-[12])"));

        let invalid = filter("id", "(unclosed", "regex");
        assert!(CompiledFilter::new(&invalid).pattern.is_none());
        assert!(CompiledFilter::new(&filter("id", "sa-1", "equals")).pattern.is_none());

        let docs = vec![doc("sa-1", 1), doc("sa-2", 2), doc("sa-3", 3)];
        assert_eq!(filter_documents(&docs, &[by_id]).len(), 2);
        assert!(filter_documents(&docs, &[invalid]).is_empty());
    }

    #[test]
    fn test_operator_wire_format() {
        let f: MetadataFilter = serde_json::from_value(serde_json::json!({
            "key": "version", "value": 2, "operator": "greaterThanOrEqual"
        }))
        .unwrap();
        assert_eq!(f.operator, Some(FilterOperator::GreaterThanOrEqual));
        assert_eq!(f.value, MetadataValue::Integer(2));

        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["operator"], "greaterThanOrEqual");

        let bare: MetadataFilter =
            serde_json::from_value(serde_json::json!({"key": "id", "value": "sa-1"})).unwrap();
        assert_eq!(bare.operator, None);
    }
}
