//! Configuration management for ReAG.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config file (`REAG_CONFIG` or `.reag/config.yaml`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default number of documents sent concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Response styles accepted in configuration.
pub const KNOWN_RESPONSE_STYLES: [&str; 2] = ["structured", "reasoning"];

/// Resolved ReAG configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReagConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Model identifier, optionally prefixed with a provider (`ollama/deepseek-r1`)
    pub model: String,

    /// Custom API base URL for the selected provider
    pub endpoint: Option<String>,

    /// API key for the selected provider
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Extra HTTP headers sent with every completion request
    pub headers: HashMap<String, String>,

    /// HTTP timeout in seconds, applied by the transport
    pub timeout: Option<u64>,

    /// Instruction prompt override
    pub system: Option<String>,

    /// Documents per batch
    pub batch_size: usize,

    /// Response parsing style override ("structured" or "reasoning")
    pub response_style: Option<String>,

    /// Opaque options merged into every completion request body
    pub model_kwargs: serde_json::Map<String, serde_json::Value>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
    timeout: Option<u64>,
    system: Option<String>,
    batch_size: Option<usize>,
    response_style: Option<String>,
    model_kwargs: Option<serde_json::Map<String, serde_json::Value>>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for ReagConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: None,
            api_key: None,
            api_key_env: None,
            headers: HashMap::new(),
            timeout: None,
            system: None,
            batch_size: DEFAULT_BATCH_SIZE,
            response_style: None,
            model_kwargs: serde_json::Map::new(),
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
        }
    }
}

impl ReagConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `REAG_CONFIG`: Path to config file
    /// - `REAG_MODEL`: Model identifier
    /// - `REAG_ENDPOINT`: API base URL
    /// - `REAG_API_KEY`: API key
    /// - `REAG_BATCH_SIZE`: Documents per batch
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use reag_core::config::ReagConfig;
    ///
    /// let config = ReagConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading `config_file` instead of the default
    /// location when given. Falls back to `REAG_CONFIG`.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self {
            config_file: config_file
                .or_else(|| std::env::var("REAG_CONFIG").ok().map(PathBuf::from)),
            ..Self::default()
        };

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(".reag/config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(model) = std::env::var("REAG_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("REAG_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Ok(batch_size) = std::env::var("REAG_BATCH_SIZE") {
            config.batch_size = batch_size.parse().map_err(|e| {
                AppError::Config(format!("Invalid REAG_BATCH_SIZE '{}': {}", batch_size, e))
            })?;
        }

        config.api_key = std::env::var("REAG_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded config file {:?}", path);

        let mut result = self.clone();

        if let Some(model) = config_file.model {
            result.model = model;
        }
        if config_file.endpoint.is_some() {
            result.endpoint = config_file.endpoint;
        }
        if config_file.api_key_env.is_some() {
            result.api_key_env = config_file.api_key_env;
        }
        result.headers.extend(config_file.headers);
        if config_file.timeout.is_some() {
            result.timeout = config_file.timeout;
        }
        if config_file.system.is_some() {
            result.system = config_file.system;
        }
        if let Some(batch_size) = config_file.batch_size {
            result.batch_size = batch_size;
        }
        if config_file.response_style.is_some() {
            result.response_style = config_file.response_style;
        }
        if let Some(kwargs) = config_file.model_kwargs {
            result.model_kwargs.extend(kwargs);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_json = format.eq_ignore_ascii_case("json");
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        endpoint: Option<String>,
        batch_size: Option<usize>,
        response_style: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.model = model;
        }

        if let Some(endpoint) = endpoint {
            self.endpoint = Some(endpoint);
        }

        if let Some(batch_size) = batch_size {
            self.batch_size = batch_size;
        }

        if let Some(style) = response_style {
            self.response_style = Some(style);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the API key: explicit key first, then the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }

    /// Validate the resolved configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.batch_size == 0 {
            return Err(AppError::Config(
                "batch size must be a positive integer".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("model must not be empty".to_string()));
        }

        if let Some(ref style) = self.response_style {
            if !KNOWN_RESPONSE_STYLES.contains(&style.to_lowercase().as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown response style: {}. Supported: {}",
                    style,
                    KNOWN_RESPONSE_STYLES.join(", ")
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ReagConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.batch_size, 20);
        assert!(config.system.is_none());
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_with_overrides() {
        let config = ReagConfig::default();
        let overridden = config.with_overrides(
            Some("ollama/deepseek-r1".to_string()),
            Some("http://localhost:11434".to_string()),
            Some(5),
            Some("reasoning".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.model, "ollama/deepseek-r1");
        assert_eq!(overridden.endpoint.as_deref(), Some("http://localhost:11434"));
        assert_eq!(overridden.batch_size, 5);
        assert_eq!(overridden.response_style.as_deref(), Some("reasoning"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
model: openrouter/deepseek/deepseek-r1
endpoint: https://openrouter.ai/api/v1
apiKeyEnv: OPENROUTER_API_KEY
batchSize: 8
responseStyle: reasoning
headers:
  X-Title: reag
modelKwargs:
  temperature: 0
logging:
  level: debug
  color: false
  format: json
"#
        )
        .unwrap();

        let merged = ReagConfig::default().merge_yaml(file.path()).unwrap();
        assert_eq!(merged.model, "openrouter/deepseek/deepseek-r1");
        assert_eq!(merged.batch_size, 8);
        assert_eq!(merged.api_key_env.as_deref(), Some("OPENROUTER_API_KEY"));
        assert_eq!(merged.headers.get("X-Title").map(String::as_str), Some("reag"));
        assert_eq!(merged.model_kwargs["temperature"], serde_json::json!(0));
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert!(merged.no_color);
        assert!(merged.log_json);
    }

    #[test]
    fn test_merge_yaml_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batchSize: [not, a, number]").unwrap();
        let result = ReagConfig::default().merge_yaml(file.path());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = ReagConfig::load_from(Some(PathBuf::from("/nonexistent/reag.yaml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let config = ReagConfig {
            batch_size: 0,
            ..ReagConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_response_style() {
        let config = ReagConfig {
            response_style: Some("poetic".to_string()),
            ..ReagConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_default() {
        assert!(ReagConfig::default().validate().is_ok());
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit() {
        let config = ReagConfig {
            api_key: Some("explicit".to_string()),
            api_key_env: Some("REAG_TEST_UNSET_KEY_VAR".to_string()),
            ..ReagConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("explicit"));
    }
}
