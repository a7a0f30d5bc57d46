//! Smart contract audit types

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

static ETHEREUM_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

pub const MISSING_ADDRESS: &str = "Missing contract-address in request header";
pub const INVALID_ADDRESS: &str = "Invalid Ethereum address format";
pub const MISSING_SOURCE: &str = "Missing contract source code in request body";

const NOT_PROVIDED: &str = "Not provided";

/// Check that a string is a 0x-prefixed, 20-byte hex Ethereum address
pub fn is_valid_ethereum_address(address: &str) -> bool {
    ETHEREUM_ADDRESS.is_match(address)
}

/// Raw body of a direct code audit request
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeCodePayload {
    pub code: Option<String>,
}

/// Contract source code to audit, with whatever metadata is known about it
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSource {
    pub address: String,
    pub name: String,
    pub source_code: String,
    pub compiler: String,
}

impl ContractSource {
    /// Source submitted directly by the caller rather than fetched from an explorer
    pub fn direct(source_code: String) -> Self {
        Self {
            address: NOT_PROVIDED.to_string(),
            name: "Direct Analysis".to_string(),
            source_code,
            compiler: NOT_PROVIDED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Informational,
    Unknown,
}

impl Severity {
    /// Lenient parse of a model-supplied severity label
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            "low" => Severity::Low,
            "info" | "informational" | "note" => Severity::Informational,
            _ => Severity::Unknown,
        }
    }

    /// Points subtracted from a perfect score for a finding of this severity
    pub fn score_penalty(self) -> f64 {
        match self {
            Severity::Critical => 3.0,
            Severity::High => 2.0,
            Severity::Medium => 1.0,
            Severity::Low => 0.5,
            Severity::Informational | Severity::Unknown => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Vulnerability {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "lineNumber")]
    pub line_number: Option<u32>,
    pub code: String,
    pub recommendation: String,
}

/// Security audit of a smart contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContractAudit {
    pub vulnerabilities: Vec<Vulnerability>,
    /// 1 (least secure) to 10 (most secure)
    #[serde(rename = "overallScore", serialize_with = "serialize_score")]
    pub overall_score: f64,
    pub summary: String,
}

/// Whole scores go out as integers, fractional ones as floats
fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if score.fract() == 0.0 && score.is_finite() {
        serializer.serialize_i64(*score as i64)
    } else {
        serializer.serialize_f64(*score)
    }
}
