//! Configuration for the page QA service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Environment variable pointing at an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "PAGE_QA_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Content limits
    pub content: ContentConfig,
    /// Page fetching configuration
    pub fetch: FetchConfig,
    /// Question answering configuration
    pub qa: QaConfig,
}

impl AppConfig {
    /// Load configuration: defaults, then `$PAGE_QA_CONFIG`, then env overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_env_with(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file; missing sections fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(max) = get("PAGE_QA_MAX_CONTENT_CHARS") {
            self.content.max_content_chars = parse_var("PAGE_QA_MAX_CONTENT_CHARS", &max)?;
        }
        if let Some(preview) = get("PAGE_QA_PREVIEW_CHARS") {
            self.content.preview_chars = parse_var("PAGE_QA_PREVIEW_CHARS", &preview)?;
        }
        if let Some(backend) = get("QA_BACKEND") {
            self.qa.backend = backend.parse()?;
        }
        if let Some(endpoint) = get("QA_ENDPOINT") {
            self.qa.http.endpoint = Some(endpoint);
        }
        if let Some(token) = get("QA_API_TOKEN") {
            self.qa.http.api_token = Some(token);
        }
        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.content.max_content_chars == 0 {
            return Err(Error::Config("max_content_chars must be greater than 0".into()));
        }
        if self.qa.onnx.doc_stride >= self.qa.onnx.max_seq_len {
            return Err(Error::Config("doc_stride must be smaller than max_seq_len".into()));
        }
        if self.qa.onnx.max_answer_tokens == 0 {
            return Err(Error::Config("max_answer_tokens must be greater than 0".into()));
        }
        if self.qa.backend == QaBackend::Http && self.qa.http.endpoint.is_none() {
            return Err(Error::Config("the http QA backend requires QA_ENDPOINT".into()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid value for {}: {}", name, e)))
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS (all origins)
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            enable_cors: true,
        }
    }
}

/// Limits applied to ingested content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Maximum stored characters, counted from the start of the cleaned text
    pub max_content_chars: usize,
    /// Characters returned as the ingest preview
    pub preview_chars: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_content_chars: 10_000,
            preview_chars: 500,
        }
    }
}

/// Page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User agent sent with page requests
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum redirects followed
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("page-qa/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_redirects: 8,
        }
    }
}

/// Which extractive QA backend answers questions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QaBackend {
    /// Local ONNX model
    #[default]
    Onnx,
    /// Hosted inference endpoint
    Http,
}

impl FromStr for QaBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "onnx" | "local" => Ok(Self::Onnx),
            "http" | "remote" => Ok(Self::Http),
            other => Err(Error::Config(format!("unsupported QA backend: {}", other))),
        }
    }
}

/// Question answering configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// Backend provider
    pub backend: QaBackend,
    /// ONNX backend settings
    pub onnx: OnnxQaConfig,
    /// HTTP backend settings
    pub http: HttpQaConfig,
}

/// ONNX extractive QA model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnnxQaConfig {
    /// Where to download the ONNX model from
    pub model_url: String,
    /// Where to download the tokenizer from
    pub tokenizer_url: String,
    /// Cache directory for model files
    pub cache_dir: PathBuf,
    /// Tokens per window, including special tokens
    pub max_seq_len: usize,
    /// Overlap in tokens between consecutive context windows
    pub doc_stride: usize,
    /// Longest answer span in tokens
    pub max_answer_tokens: usize,
    /// Spans scoring below this are reported as no answer
    pub min_score: f32,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for OnnxQaConfig {
    fn default() -> Self {
        Self {
            model_url: "https://huggingface.co/Xenova/distilbert-base-cased-distilled-squad/resolve/main/onnx/model.onnx".to_string(),
            tokenizer_url: "https://huggingface.co/Xenova/distilbert-base-cased-distilled-squad/resolve/main/tokenizer.json".to_string(),
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("page-qa")
                .join("distilbert-squad"),
            max_seq_len: 384,
            doc_stride: 128,
            max_answer_tokens: 15,
            min_score: 0.0,
            intra_threads: 4,
        }
    }
}

/// Hosted QA endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpQaConfig {
    /// Inference endpoint URL
    pub endpoint: Option<String>,
    /// Bearer token, if the endpoint requires one
    pub api_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpQaConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.content.max_content_chars, 10_000);
        assert_eq!(config.content.preview_chars, 500);
        assert_eq!(config.qa.backend, QaBackend::Onnx);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_with(env(&[
                ("PORT", "8088"),
                ("PAGE_QA_MAX_CONTENT_CHARS", "2000"),
                ("QA_BACKEND", "http"),
                ("QA_ENDPOINT", "http://localhost:9000/qa"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.content.max_content_chars, 2000);
        assert_eq!(config.qa.backend, QaBackend::Http);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let mut config = AppConfig::default();
        let err = config.apply_env_with(env(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_http_backend_requires_endpoint() {
        let mut config = AppConfig::default();
        config.qa.backend = QaBackend::Http;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [content]
            max_content_chars = 500

            [qa.onnx]
            min_score = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.content.max_content_chars, 500);
        assert_eq!(config.content.preview_chars, 500);
        assert_eq!(config.server.port, 10000);
        assert!((config.qa.onnx.min_score - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page-qa.toml");
        std::fs::write(&path, "[server]\nport = 9999\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9999);
    }
}
