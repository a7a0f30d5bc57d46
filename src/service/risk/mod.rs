//! Token risk analysis service using LLM
//!
//! Builds a prompt from the token identity, asks the model for a risk
//! breakdown and normalizes whatever JSON comes back.

use crate::model::{RiskAnalysis, TokenRiskRequest};
use crate::service::extraction::{self, ExtractionError, ExtractionOptions};
use crate::service::llm::{GenerationRequest, LlmClient, LlmError};

pub mod normalize;
pub mod prompts;

use normalize::{normalize_risk_analysis, RawRiskAnalysis};
use prompts::build_risk_prompt;

#[derive(Debug, thiserror::Error)]
pub enum RiskAnalysisError {
    #[error("Failed to analyze token: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to analyze token: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Service for AI-driven token risk analysis
pub struct RiskAnalysisService {
    llm_client: LlmClient,
    model: String,
    extraction: ExtractionOptions,
}

impl RiskAnalysisService {
    pub fn new(llm_client: LlmClient, model: impl Into<String>, extraction: ExtractionOptions) -> Self {
        let model = model.into();

        tracing::info!(
            model = %model,
            brace_strategy = ?extraction.brace_strategy,
            "Risk analysis service initialized"
        );

        Self {
            llm_client,
            model,
            extraction,
        }
    }

    /// Analyze a token and return a normalized risk breakdown
    pub async fn analyze(&self, request: &TokenRiskRequest) -> Result<RiskAnalysis, RiskAnalysisError> {
        tracing::debug!(
            token = %request.token_name,
            token_address = %request.token_address,
            contract = %request.smart_contract_address,
            "Starting token risk analysis"
        );

        let prompt = build_risk_prompt(request);
        let text = self
            .llm_client
            .complete(&GenerationRequest::new(&self.model, prompt))
            .await?;

        let raw: RawRiskAnalysis = extraction::extract(&text, self.extraction)?;
        let analysis = normalize_risk_analysis(raw);

        tracing::info!(
            token = %request.token_name,
            insights_count = analysis.insights.len(),
            chart_points = analysis.chart_data.len(),
            recommendations_count = analysis.ai_recommendations.len(),
            "Token risk analysis complete"
        );

        Ok(analysis)
    }
}
