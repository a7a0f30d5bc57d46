//! Unified API error handling
//!
//! Every failure reaches the client as `{"error": "<message>"}`. Upstream
//! payloads and raw model output are logged, never returned.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::service::{ContractAuditError, ExtractionError, LlmError, RiskAnalysisError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Candidate text longer than this is cut in logs
const CANDIDATE_LOG_CHARS: usize = 2_000;

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Unified API error type
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Malformed or missing request fields (400)
    #[error("{0}")]
    Validation(String),

    /// Explorer or model provider failed (500)
    #[error("{0}")]
    Upstream(String),

    /// No JSON object in the model's reply (500)
    #[error("{0}")]
    Extraction(String),

    /// Model JSON could not be parsed or did not fit the schema (500)
    #[error("{0}")]
    Parse(String),

    /// Model call exceeded the configured timeout (504)
    #[error("{0}")]
    Timeout(String),
}

impl ApiError {
    pub fn validation(message: &str) -> Self {
        ApiError::Validation(message.to_string())
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Extraction(_) => "extraction_error",
            ApiError::Parse(_) => "parse_error",
            ApiError::Timeout(_) => "timeout_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) | ApiError::Extraction(_) | ApiError::Parse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_type = self.error_type(),
                status = status.as_u16(),
                message = %self,
                "API error"
            );
        } else {
            tracing::info!(
                request_id = %request_id,
                error_type = self.error_type(),
                status = status.as_u16(),
                message = %self,
                "Rejected request"
            );
        }

        HttpResponse::build(status)
            .insert_header((REQUEST_ID_HEADER, request_id))
            .json(ErrorResponse {
                error: self.to_string(),
            })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

fn log_model_output(err: &ExtractionError) {
    if let Some(candidate) = err.candidate() {
        tracing::warn!(
            candidate_length = candidate.len(),
            candidate = %candidate.chars().take(CANDIDATE_LOG_CHARS).collect::<String>(),
            "Model returned unparseable JSON"
        );
    }
    if let Some(detail) = err.schema_detail() {
        tracing::warn!(
            detail = %detail.chars().take(CANDIDATE_LOG_CHARS).collect::<String>(),
            "Model JSON has an unexpected shape"
        );
    }
}

fn classify_llm(err: &LlmError, message: String) -> ApiError {
    match err {
        LlmError::Timeout(_) => ApiError::Timeout(message),
        LlmError::Upstream(_) | LlmError::EmptyResponse => ApiError::Upstream(message),
    }
}

fn classify_extraction(err: &ExtractionError, message: String) -> ApiError {
    log_model_output(err);
    match err {
        ExtractionError::NotFound => ApiError::Extraction(message),
        ExtractionError::Parse { .. } | ExtractionError::Schema { .. } => {
            ApiError::Parse(message)
        }
    }
}

impl From<RiskAnalysisError> for ApiError {
    fn from(err: RiskAnalysisError) -> Self {
        let message = err.to_string();
        match &err {
            RiskAnalysisError::Llm(e) => classify_llm(e, message),
            RiskAnalysisError::Extraction(e) => classify_extraction(e, message),
        }
    }
}

impl From<ContractAuditError> for ApiError {
    fn from(err: ContractAuditError) -> Self {
        let message = err.to_string();
        match &err {
            ContractAuditError::Explorer(_) => ApiError::Upstream(message),
            ContractAuditError::Llm(e) => classify_llm(e, message),
            ContractAuditError::Extraction(e) => classify_extraction(e, message),
        }
    }
}
