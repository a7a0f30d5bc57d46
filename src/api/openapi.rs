//! OpenAPI specification endpoints

use actix_web::{get, web, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::api::{audit, error::ErrorResponse, risk};
use crate::model::{
    ChartPoint, ContractAudit, Recommendation, RiskScore, SeriesStyle, Severity,
    TokenRiskRequest, Vulnerability,
};
use crate::model::risk::{InsightView, RiskAnalysisResponse};

#[derive(OpenApi)]
#[openapi(
    info(title = "Token Risk Analysis API", description = "AI-generated risk profiles for crypto tokens"),
    paths(risk::analyze_token, risk::health),
    components(schemas(
        TokenRiskRequest,
        RiskAnalysisResponse,
        RiskScore,
        InsightView,
        ChartPoint,
        SeriesStyle,
        Recommendation,
        risk::HealthStatus,
        ErrorResponse
    )),
    tags(
        (name = "risk", description = "Token risk analysis"),
        (name = "health", description = "Service health")
    )
)]
pub struct RiskApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(title = "Smart Contract Audit API", description = "AI-generated security audits for smart contracts"),
    paths(audit::analyze_deployed_contract, audit::analyze_source_code, audit::welcome),
    components(schemas(
        audit::AnalyzeCodeRequest,
        audit::WelcomeMessage,
        ContractAudit,
        Vulnerability,
        Severity,
        ErrorResponse
    )),
    tags(
        (name = "audit", description = "Smart contract audits"),
        (name = "health", description = "Service health")
    )
)]
pub struct AuditApiDoc;

fn yaml_response(doc: utoipa::openapi::OpenApi) -> HttpResponse {
    match serde_yaml::to_string(&doc) {
        Ok(body) => HttpResponse::Ok().content_type("text/yaml").body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI document as YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/openapi.json")]
pub async fn risk_openapi_json() -> impl Responder {
    HttpResponse::Ok().json(RiskApiDoc::openapi())
}

#[get("/openapi.yaml")]
pub async fn risk_openapi_yaml() -> impl Responder {
    yaml_response(RiskApiDoc::openapi())
}

#[get("/openapi.json")]
pub async fn audit_openapi_json() -> impl Responder {
    HttpResponse::Ok().json(AuditApiDoc::openapi())
}

#[get("/openapi.yaml")]
pub async fn audit_openapi_yaml() -> impl Responder {
    yaml_response(AuditApiDoc::openapi())
}

/// OpenAPI routes for the risk analysis service
pub fn configure_risk(cfg: &mut web::ServiceConfig) {
    cfg.service(risk_openapi_json).service(risk_openapi_yaml);
}

/// OpenAPI routes for the contract audit service
pub fn configure_audit(cfg: &mut web::ServiceConfig) {
    cfg.service(audit_openapi_json).service(audit_openapi_yaml);
}
