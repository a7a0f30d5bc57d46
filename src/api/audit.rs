//! REST API endpoints for smart contract audits

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorResponse};
use crate::app::ContractAuditState;
use crate::model::audit::{
    is_valid_ethereum_address, AnalyzeCodePayload, INVALID_ADDRESS, MISSING_ADDRESS,
    MISSING_SOURCE,
};
use crate::model::ContractAudit;

pub const CONTRACT_ADDRESS_HEADER: &str = "contract-address";

/// Largest accepted request body for direct code audits
const MAX_SOURCE_BODY_BYTES: usize = 4 * 1024 * 1024;

#[derive(Serialize, ToSchema)]
pub struct WelcomeMessage {
    pub message: String,
}

/// Body of a direct code audit request
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AnalyzeCodeRequest {
    /// Contract source code
    code: String,
}

/// Audit a deployed contract by address
///
/// Verified source is fetched from Etherscan before the audit.
#[utoipa::path(
    get,
    path = "/analyze-contract",
    params(
        ("contract-address" = String, Header, description = "0x-prefixed 20-byte contract address")
    ),
    responses(
        (status = 200, description = "Audit generated", body = ContractAudit),
        (status = 400, description = "Missing or malformed address", body = ErrorResponse),
        (status = 500, description = "Explorer lookup, model call or response extraction failed", body = ErrorResponse),
        (status = 504, description = "Model call timed out", body = ErrorResponse)
    ),
    tag = "audit"
)]
#[get("/analyze-contract")]
pub async fn analyze_deployed_contract(
    state: web::Data<ContractAuditState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let header = req
        .headers()
        .get(CONTRACT_ADDRESS_HEADER)
        .ok_or_else(|| ApiError::validation(MISSING_ADDRESS))?;

    let address = header
        .to_str()
        .ok()
        .filter(|a| is_valid_ethereum_address(a))
        .ok_or_else(|| ApiError::validation(INVALID_ADDRESS))?;

    tracing::info!(address = %address, "Received contract audit request");

    let audit = state.service.audit_address(address).await?;
    Ok(HttpResponse::Ok().json(audit))
}

/// Audit source code submitted in the request body
#[utoipa::path(
    post,
    path = "/analyze-contract",
    request_body = AnalyzeCodeRequest,
    responses(
        (status = 200, description = "Audit generated", body = ContractAudit),
        (status = 400, description = "Missing source code", body = ErrorResponse),
        (status = 500, description = "Model call or response extraction failed", body = ErrorResponse),
        (status = 504, description = "Model call timed out", body = ErrorResponse)
    ),
    tag = "audit"
)]
#[post("/analyze-contract")]
pub async fn analyze_source_code(
    state: web::Data<ContractAuditState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let code = serde_json::from_slice::<AnalyzeCodePayload>(&body)
        .ok()
        .and_then(|p| p.code)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::validation(MISSING_SOURCE))?;

    tracing::info!(source_length = code.len(), "Received direct code audit request");

    let audit = state.service.audit_source(code).await?;
    Ok(HttpResponse::Ok().json(audit))
}

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = WelcomeMessage)
    ),
    tag = "health"
)]
#[get("/")]
pub async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(WelcomeMessage {
        message: "Welcome to Smart contract auditor, Please make request on /analyze-contract route"
            .to_string(),
    })
}

/// Configure contract audit routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_SOURCE_BODY_BYTES))
        .service(analyze_deployed_contract)
        .service(analyze_source_code)
        .service(welcome);
}
