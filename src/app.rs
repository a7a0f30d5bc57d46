//! Application state and service initialization
//!
//! Each service builds its state once at start-up from [`Config`]. The state is
//! shared read-only across request handlers for the lifetime of the process.

use std::sync::Arc;

use crate::model::{ApiKey, Config, IconFormat};
use crate::service::{
    AuditOptions, ContractAuditService, ContractSourceProvider, EtherscanClient,
    ExtractionOptions, GeminiClient, LlmClient, RiskAnalysisService, TextGenerator,
};

/// State for the risk analysis service
pub struct RiskAnalysisState {
    pub service: RiskAnalysisService,
    pub icon_format: IconFormat,
}

impl RiskAnalysisState {
    /// Initialize the risk analysis service (requires GEMINI_API_KEY)
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let generator = gemini_generator(config)?;
        Ok(Self::new(generator, config))
    }

    /// Build state around an existing generator
    pub fn new(generator: Arc<dyn TextGenerator>, config: &Config) -> Self {
        let llm_client = LlmClient::new(generator).with_timeout(config.llm_timeout);
        let service = RiskAnalysisService::new(
            llm_client,
            config.risk_model.clone(),
            ExtractionOptions::new(config.brace_strategy),
        );

        Self {
            service,
            icon_format: config.icon_format,
        }
    }
}

/// State for the contract audit service
pub struct ContractAuditState {
    pub service: ContractAuditService,
}

impl ContractAuditState {
    /// Initialize the contract audit service (requires GEMINI_API_KEY and ETHERSCAN_API_KEY)
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let generator = gemini_generator(config)?;
        let etherscan_key = required_key(&config.etherscan_api_key, "ETHERSCAN_API_KEY")?;
        let explorer = Arc::new(EtherscanClient::new(
            config.etherscan_base_url.clone(),
            etherscan_key,
        ));

        Ok(Self::new(generator, explorer, config))
    }

    /// Build state around existing collaborators
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        explorer: Arc<dyn ContractSourceProvider>,
        config: &Config,
    ) -> Self {
        let llm_client = LlmClient::new(generator).with_timeout(config.llm_timeout);
        let service = ContractAuditService::new(
            llm_client,
            explorer,
            AuditOptions {
                model: config.audit_model.clone(),
                params: config.generation,
                max_source_chars: config.max_source_chars,
                extraction: ExtractionOptions::new(config.brace_strategy),
            },
        );

        Self { service }
    }
}

fn gemini_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, AppError> {
    let key = required_key(&config.gemini_api_key, "GEMINI_API_KEY")?;
    Ok(Arc::new(GeminiClient::new(config.gemini_base_url.clone(), key)))
}

fn required_key(key: &Option<ApiKey>, name: &'static str) -> Result<ApiKey, AppError> {
    key.clone().ok_or(AppError::MissingConfig(name))
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),
}
