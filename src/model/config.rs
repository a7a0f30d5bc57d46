use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::model::risk::IconFormat;
use crate::service::extraction::BraceStrategy;
use crate::service::llm::GenerationParams;

const ENV_CONFIG_PATH: &str = "CRYPTO_RISK_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
const ENV_ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";
const ENV_ETHERSCAN_BASE_URL: &str = "ETHERSCAN_BASE_URL";
const ENV_RISK_MODEL: &str = "RISK_MODEL";
const ENV_AUDIT_MODEL: &str = "AUDIT_MODEL";
const ENV_LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io";
const DEFAULT_RISK_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_AUDIT_MODEL: &str = "gemini-1.5-flash";

/// Source code longer than this is truncated before it is sent to the model
pub const DEFAULT_MAX_SOURCE_CHARS: usize = 30_000;

/// API key that never shows up in `Debug` output
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Generative-AI settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSettings {
    /// Upper bound on a single model call. No bound when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub risk_model: Option<String>,
    #[serde(default)]
    pub audit_model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default)]
    pub brace_strategy: BraceStrategy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditSettings {
    #[serde(default = "default_max_source_chars")]
    pub max_source_chars: usize,
    #[serde(default)]
    pub generation: GenerationParams,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            max_source_chars: DEFAULT_MAX_SOURCE_CHARS,
            generation: GenerationParams::default(),
        }
    }
}

fn default_max_source_chars() -> usize {
    DEFAULT_MAX_SOURCE_CHARS
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresentationSettings {
    #[serde(default)]
    pub icon_format: IconFormat,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub audit: AuditSettings,
    #[serde(default)]
    pub presentation: PresentationSettings,
}

/// Application configuration
///
/// Built once at start-up and shared read-only with every request handler.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<ApiKey>,
    pub gemini_base_url: Url,
    pub etherscan_api_key: Option<ApiKey>,
    pub etherscan_base_url: Url,
    pub risk_model: String,
    pub audit_model: String,
    pub llm_timeout: Option<Duration>,
    pub brace_strategy: BraceStrategy,
    pub max_source_chars: usize,
    pub generation: GenerationParams,
    pub icon_format: IconFormat,
}

impl Config {
    /// Build a configuration from a parsed file, without consulting the environment
    pub fn from_file(file: ConfigFile, default_port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: default_port,
            gemini_api_key: None,
            gemini_base_url: default_url(DEFAULT_GEMINI_BASE_URL),
            etherscan_api_key: None,
            etherscan_base_url: default_url(DEFAULT_ETHERSCAN_BASE_URL),
            risk_model: file
                .llm
                .risk_model
                .unwrap_or_else(|| DEFAULT_RISK_MODEL.to_string()),
            audit_model: file
                .llm
                .audit_model
                .unwrap_or_else(|| DEFAULT_AUDIT_MODEL.to_string()),
            llm_timeout: file.llm.timeout_secs.map(Duration::from_secs),
            brace_strategy: file.extraction.brace_strategy,
            max_source_chars: file.audit.max_source_chars,
            generation: file.audit.generation,
            icon_format: file.presentation.icon_format,
        }
    }

    /// Load configuration from environment and config file
    ///
    /// Environment variables take precedence over the file.
    pub fn from_env(default_port: u16) -> Self {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();
        let mut config = Self::from_file(file, default_port);

        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Ok(host) = std::env::var("HOST") {
            config.host = host;
        }

        config.gemini_api_key = env_key(ENV_GEMINI_API_KEY);
        config.etherscan_api_key = env_key(ENV_ETHERSCAN_API_KEY);

        if let Some(url) = env_url(ENV_GEMINI_BASE_URL) {
            config.gemini_base_url = url;
        }
        if let Some(url) = env_url(ENV_ETHERSCAN_BASE_URL) {
            config.etherscan_base_url = url;
        }
        if let Ok(model) = std::env::var(ENV_RISK_MODEL) {
            config.risk_model = model;
        }
        if let Ok(model) = std::env::var(ENV_AUDIT_MODEL) {
            config.audit_model = model;
        }
        if let Some(secs) = std::env::var(ENV_LLM_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.llm_timeout = Some(Duration::from_secs(secs));
        }

        config
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => parse_config_file(&contents)
                .inspect(|_| tracing::info!(path = %path.display(), "Loaded configuration from file"))
                .map_err(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                })
                .ok(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse YAML config contents; an empty file yields the defaults
pub fn parse_config_file(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    let contents = contents.trim();
    if contents.is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(contents)
}

fn env_key(name: &str) -> Option<ApiKey> {
    std::env::var(name)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .map(ApiKey::new)
}

fn env_url(name: &str) -> Option<Url> {
    let raw = std::env::var(name).ok()?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(variable = name, error = %e, "Ignoring invalid URL");
            None
        }
    }
}

fn default_url(raw: &'static str) -> Url {
    Url::parse(raw).expect("default URLs are valid")
}
