pub mod audit;
pub mod config;
pub mod etherscan;
pub mod gemini;
pub mod risk;

pub use audit::{ContractAudit, ContractSource, Severity, Vulnerability};
pub use config::{ApiKey, Config};
pub use risk::{
    ChartPoint, IconFormat, Insight, InsightIcon, Recommendation, RiskAnalysis, RiskScore,
    SeriesStyle, TokenRiskRequest,
};
