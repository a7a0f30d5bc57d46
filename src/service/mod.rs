pub mod audit;
pub mod explorer;
pub mod extraction;
pub mod gemini;
pub mod llm;
pub mod risk;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::{AuditOptions, ContractAuditError, ContractAuditService};
pub use explorer::{ContractSourceProvider, EtherscanClient, ExplorerError};
pub use extraction::{BraceStrategy, ExtractionError, ExtractionOptions};
pub use gemini::GeminiClient;
pub use llm::{GenerationParams, GenerationRequest, LlmClient, LlmError, TextGenerator};
pub use risk::{RiskAnalysisError, RiskAnalysisService};
