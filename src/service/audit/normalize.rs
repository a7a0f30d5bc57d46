//! Normalization of model-produced contract audits

use serde::Deserialize;

use crate::model::{ContractAudit, Severity, Vulnerability};
use crate::service::extraction::lenient_number;

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Default, Deserialize)]
pub struct RawContractAudit {
    #[serde(default)]
    pub vulnerabilities: Option<Vec<RawVulnerability>>,
    #[serde(default, rename = "overallScore", deserialize_with = "lenient_number")]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawVulnerability {
    #[serde(default, deserialize_with = "lenient_number")]
    pub id: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, rename = "lineNumber", deserialize_with = "lenient_number")]
    pub line_number: Option<f64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Score derived from the findings when the model gives none
pub fn score_from_findings(vulnerabilities: &[Vulnerability]) -> f64 {
    let penalty: f64 = vulnerabilities
        .iter()
        .map(|v| v.severity.score_penalty())
        .sum();
    (MAX_SCORE - penalty).clamp(MIN_SCORE, MAX_SCORE)
}

fn positive_integer(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.round().min(u32::MAX as f64) as u32)
}

pub fn normalize_contract_audit(raw: RawContractAudit) -> ContractAudit {
    let vulnerabilities: Vec<Vulnerability> = raw
        .vulnerabilities
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, v)| Vulnerability {
            id: positive_integer(v.id).unwrap_or(index as u32 + 1),
            name: v
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unnamed finding".to_string()),
            description: v.description.unwrap_or_default(),
            severity: v
                .severity
                .as_deref()
                .map(Severity::parse)
                .unwrap_or(Severity::Unknown),
            line_number: positive_integer(v.line_number),
            code: v.code.unwrap_or_default(),
            recommendation: v.recommendation.unwrap_or_default(),
        })
        .collect();

    let overall_score = match raw.overall_score.filter(|s| s.is_finite()) {
        Some(score) => score.clamp(MIN_SCORE, MAX_SCORE),
        None => {
            let derived = score_from_findings(&vulnerabilities);
            tracing::debug!(derived_score = derived, "Model omitted overallScore, derived from findings");
            derived
        }
    };

    ContractAudit {
        vulnerabilities,
        overall_score,
        summary: raw.summary.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawContractAudit {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_complete_audit_passes_through() {
        let audit = normalize_contract_audit(raw(json!({
            "vulnerabilities": [{
                "id": 1,
                "name": "Reentrancy",
                "description": "withdraw() calls out before updating balances",
                "severity": "High",
                "lineNumber": 42,
                "code": "msg.sender.call{value: amount}(\"\")",
                "recommendation": "Use checks-effects-interactions"
            }],
            "overallScore": 4,
            "summary": "One high severity issue"
        })));

        assert_eq!(audit.overall_score, 4.0);
        assert_eq!(audit.summary, "One high severity issue");
        let v = &audit.vulnerabilities[0];
        assert_eq!(v.id, 1);
        assert_eq!(v.severity, Severity::High);
        assert_eq!(v.line_number, Some(42));
        assert_eq!(v.recommendation, "Use checks-effects-interactions");
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let audit = normalize_contract_audit(raw(json!({
            "vulnerabilities": [{"severity": "critical"}, {"name": "  ", "lineNumber": 0}]
        })));

        assert_eq!(audit.summary, "");
        assert_eq!(audit.vulnerabilities[0].id, 1);
        assert_eq!(audit.vulnerabilities[1].id, 2);
        assert_eq!(audit.vulnerabilities[1].name, "Unnamed finding");
        assert_eq!(audit.vulnerabilities[1].severity, Severity::Unknown);
        assert_eq!(audit.vulnerabilities[1].line_number, None);
        // 10 - 3 for the critical finding
        assert_eq!(audit.overall_score, 7.0);
    }

    #[test]
    fn test_string_numbers_are_tolerated() {
        let audit = normalize_contract_audit(raw(json!({
            "vulnerabilities": [
                {"id": "SWC-107", "name": "Reentrancy", "severity": "High", "lineNumber": "12-15"},
                {"id": "4", "name": "tx.origin", "severity": "Low", "lineNumber": "30"}
            ],
            "overallScore": "7",
            "summary": "s"
        })));

        assert_eq!(audit.vulnerabilities[0].id, 1);
        assert_eq!(audit.vulnerabilities[0].line_number, None);
        assert_eq!(audit.vulnerabilities[1].id, 4);
        assert_eq!(audit.vulnerabilities[1].line_number, Some(30));
        assert_eq!(audit.overall_score, 7.0);
    }

    #[test]
    fn test_unreadable_score_is_derived() {
        let audit = normalize_contract_audit(raw(json!({
            "vulnerabilities": [{"severity": "High"}],
            "overallScore": "moderately secure"
        })));
        assert_eq!(audit.overall_score, 8.0);
    }

    #[test]
    fn test_score_is_clamped() {
        let high = normalize_contract_audit(raw(json!({"overallScore": 14})));
        let low = normalize_contract_audit(raw(json!({"overallScore": -2})));
        assert_eq!(high.overall_score, 10.0);
        assert_eq!(low.overall_score, 1.0);
    }

    #[test]
    fn test_empty_audit_scores_perfect() {
        let audit = normalize_contract_audit(raw(json!({})));
        assert!(audit.vulnerabilities.is_empty());
        assert_eq!(audit.overall_score, 10.0);
    }

    #[test]
    fn test_derived_score_floor() {
        let findings: Vec<Vulnerability> = (0..5)
            .map(|i| Vulnerability {
                id: i,
                name: "x".to_string(),
                description: String::new(),
                severity: Severity::Critical,
                line_number: None,
                code: String::new(),
                recommendation: String::new(),
            })
            .collect();
        assert_eq!(score_from_findings(&findings), 1.0);
    }
}
