//! REST API endpoints for token risk analysis

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorResponse};
use crate::app::RiskAnalysisState;
use crate::model::risk::{RiskAnalysisResponse, TokenRiskPayload, INVALID_TOKEN_DATA};
use crate::model::TokenRiskRequest;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

/// Analyze a token's risk profile
#[utoipa::path(
    post,
    path = "/risk-analysis",
    request_body = TokenRiskRequest,
    responses(
        (status = 200, description = "Risk analysis generated", body = RiskAnalysisResponse),
        (status = 400, description = "Missing or empty token fields", body = ErrorResponse),
        (status = 500, description = "Model call or response extraction failed", body = ErrorResponse),
        (status = 504, description = "Model call timed out", body = ErrorResponse)
    ),
    tag = "risk"
)]
#[post("/risk-analysis")]
pub async fn analyze_token(
    state: web::Data<RiskAnalysisState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let payload: TokenRiskPayload =
        serde_json::from_slice(&body).map_err(|_| ApiError::validation(INVALID_TOKEN_DATA))?;
    let request = TokenRiskRequest::try_from(payload).map_err(ApiError::validation)?;

    tracing::info!(token = %request.token_name, "Received risk analysis request");

    let analysis = state.service.analyze(&request).await?;
    Ok(HttpResponse::Ok().json(RiskAnalysisResponse::render(analysis, state.icon_format)))
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "OK".to_string(),
    })
}

/// Configure risk analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_token).service(health);
}
