//! Smart contract audit service using LLM
//!
//! Audits either source fetched from the explorer by address, or source the
//! caller submits directly.

use std::sync::Arc;

use crate::model::{ContractAudit, ContractSource};
use crate::service::explorer::{ContractSourceProvider, ExplorerError};
use crate::service::extraction::{self, ExtractionError, ExtractionOptions};
use crate::service::llm::{GenerationParams, GenerationRequest, LlmClient, LlmError};

pub mod normalize;
pub mod prompts;

use normalize::{normalize_contract_audit, RawContractAudit};
use prompts::{build_audit_prompt, AUDIT_SYSTEM_INSTRUCTION};

#[derive(Debug, thiserror::Error)]
pub enum ContractAuditError {
    #[error("Failed to retrieve contract source: {0}")]
    Explorer(#[from] ExplorerError),

    #[error("Error analyzing with Gemini: {0}")]
    Llm(#[from] LlmError),

    #[error("Error analyzing with Gemini: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Audit tuning knobs
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub model: String,
    pub params: GenerationParams,
    pub max_source_chars: usize,
    pub extraction: ExtractionOptions,
}

/// Service for AI-driven smart contract audits
pub struct ContractAuditService {
    llm_client: LlmClient,
    explorer: Arc<dyn ContractSourceProvider>,
    options: AuditOptions,
}

impl ContractAuditService {
    /// The model's reply is stripped of an outer fence before the brace search,
    /// whatever `options.extraction` says.
    pub fn new(
        llm_client: LlmClient,
        explorer: Arc<dyn ContractSourceProvider>,
        mut options: AuditOptions,
    ) -> Self {
        options.extraction = options.extraction.strip_outer_fences();

        tracing::info!(
            model = %options.model,
            max_source_chars = options.max_source_chars,
            brace_strategy = ?options.extraction.brace_strategy,
            "Contract audit service initialized"
        );

        Self {
            llm_client,
            explorer,
            options,
        }
    }

    /// Fetch verified source for `address` and audit it
    ///
    /// The address must already be validated.
    pub async fn audit_address(&self, address: &str) -> Result<ContractAudit, ContractAuditError> {
        let contract = self.explorer.contract_source(address).await?;
        self.audit(&contract).await
    }

    /// Audit source code submitted by the caller
    pub async fn audit_source(&self, source_code: String) -> Result<ContractAudit, ContractAuditError> {
        self.audit(&ContractSource::direct(source_code)).await
    }

    async fn audit(&self, contract: &ContractSource) -> Result<ContractAudit, ContractAuditError> {
        tracing::debug!(
            address = %contract.address,
            contract_name = %contract.name,
            source_length = contract.source_code.len(),
            "Starting contract audit"
        );

        let prompt = build_audit_prompt(contract, self.options.max_source_chars);
        let request = GenerationRequest::new(&self.options.model, prompt)
            .with_system_instruction(AUDIT_SYSTEM_INSTRUCTION)
            .with_params(self.options.params);

        let text = self.llm_client.complete(&request).await?;
        let raw: RawContractAudit = extraction::extract(&text, self.options.extraction)?;
        let audit = normalize_contract_audit(raw);

        tracing::info!(
            address = %contract.address,
            contract_name = %contract.name,
            vulnerabilities_count = audit.vulnerabilities.len(),
            overall_score = audit.overall_score,
            "Contract audit complete"
        );

        Ok(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::extraction::BraceStrategy;
    use crate::service::testing::{StubGenerator, StubSourceProvider};

    const ADDRESS: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

    fn options() -> AuditOptions {
        AuditOptions {
            model: "gemini-1.5-flash".to_string(),
            params: GenerationParams::default(),
            max_source_chars: 30_000,
            extraction: ExtractionOptions::new(BraceStrategy::Greedy),
        }
    }

    fn service(generator: Arc<StubGenerator>, explorer: Arc<StubSourceProvider>) -> ContractAuditService {
        ContractAuditService::new(LlmClient::new(generator), explorer, options())
    }

    #[tokio::test]
    async fn test_audit_by_address() {
        let generator = Arc::new(StubGenerator::text(
            "{\"vulnerabilities\": [], \"overallScore\": 9, \"summary\": \"Clean\"}",
        ));
        let explorer = Arc::new(StubSourceProvider::with_source(
            "TetherToken",
            "contract TetherToken {}",
        ));

        let audit = service(generator.clone(), explorer.clone())
            .audit_address(ADDRESS)
            .await
            .unwrap();

        assert_eq!(audit.overall_score, 9.0);
        assert_eq!(explorer.lookups(), vec![ADDRESS.to_string()]);

        let sent = &generator.requests()[0];
        assert_eq!(sent.model, "gemini-1.5-flash");
        assert_eq!(sent.system_instruction.as_deref(), Some(AUDIT_SYSTEM_INSTRUCTION));
        assert_eq!(sent.params, Some(GenerationParams::default()));
        assert!(sent.prompt.contains("Contract name: TetherToken"));
        assert!(sent.prompt.contains(&format!("Contract address: {}", ADDRESS)));
    }

    #[tokio::test]
    async fn test_unverified_contract_skips_model() {
        let generator = Arc::new(StubGenerator::text("{}"));
        let explorer = Arc::new(StubSourceProvider::unverified());

        let err = service(generator.clone(), explorer)
            .audit_address(ADDRESS)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to retrieve contract source: No verified source code available for this contract"
        );
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fenced_reply_without_language_tag() {
        let generator = Arc::new(StubGenerator::text(
            "```\n{\"vulnerabilities\": [{\"name\": \"tx.origin auth\", \"severity\": \"Medium\"}], \"summary\": \"s\"}\n```",
        ));
        let explorer = Arc::new(StubSourceProvider::unverified());

        let audit = service(generator, explorer)
            .audit_source("contract A {}".to_string())
            .await
            .unwrap();

        assert_eq!(audit.vulnerabilities.len(), 1);
        assert_eq!(audit.overall_score, 9.0);
    }

    #[tokio::test]
    async fn test_textual_ids_and_scores_still_audit() {
        let generator = Arc::new(StubGenerator::text(
            r#"{"vulnerabilities": [{"id": "SWC-107", "name": "Reentrancy", "severity": "High"}], "overallScore": "7", "summary": "s"}"#,
        ));
        let explorer = Arc::new(StubSourceProvider::unverified());

        let audit = service(generator, explorer)
            .audit_source("contract A {}".to_string())
            .await
            .unwrap();

        assert_eq!(audit.vulnerabilities[0].id, 1);
        assert_eq!(audit.vulnerabilities[0].name, "Reentrancy");
        assert_eq!(audit.overall_score, 7.0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let generator = Arc::new(StubGenerator::text("{\"vulnerabilities\": [,], }"));
        let explorer = Arc::new(StubSourceProvider::unverified());

        let err = service(generator, explorer)
            .audit_source("contract A {}".to_string())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ContractAuditError::Extraction(ExtractionError::Parse { .. })
        ));
    }
}
