//! Loading documents and parsing filter flags.

use reag::{Document, MetadataFilter, MetadataValue, QueryOptions};
use reag_core::{AppError, AppResult};
use std::path::Path;

/// Load a list of documents from a `.json` or `.yaml`/`.yml` file.
pub fn load_documents(path: &Path) -> AppResult<Vec<Document>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read documents file {:?}: {}", path, e))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let documents: Vec<Document> = if is_json {
        serde_json::from_str(&contents)?
    } else {
        serde_yaml::from_str(&contents)?
    };

    tracing::debug!("Loaded {} documents from {:?}", documents.len(), path);

    Ok(documents)
}

/// Parse `key=value` (equality) or `key:operator:value`.
///
/// Values that parse as integers become integer filters.
pub fn parse_filter(raw: &str) -> AppResult<MetadataFilter> {
    let invalid = || {
        AppError::Config(format!(
            "Invalid filter '{}'. Use key=value or key:operator:value",
            raw
        ))
    };

    let (key, operator, value) = match raw.split_once('=') {
        Some((key, value)) if !key.contains(':') => (key, None, value),
        _ => {
            let mut parts = raw.splitn(3, ':');
            let key = parts.next().ok_or_else(invalid)?;
            let operator = parts.next().ok_or_else(invalid)?;
            let value = parts.next().ok_or_else(invalid)?;
            (key, Some(operator), value)
        }
    };

    if key.is_empty() {
        return Err(invalid());
    }

    let value = match value.parse::<i64>() {
        Ok(n) => MetadataValue::Integer(n),
        Err(_) => MetadataValue::Text(value.to_string()),
    };

    let filter = MetadataFilter::new(key, value);
    Ok(match operator {
        Some(op) => filter.with_operator(op),
        None => filter,
    })
}

/// Build query options from repeated `--filter` flags.
pub fn query_options(filters: &[String]) -> AppResult<QueryOptions> {
    if filters.is_empty() {
        return Ok(QueryOptions::default());
    }

    let filters = filters
        .iter()
        .map(|raw| parse_filter(raw))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(QueryOptions::with_filters(filters))
}
