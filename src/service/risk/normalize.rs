//! Normalization of model-produced risk analyses
//!
//! The model's JSON is read into lenient `Raw*` shapes where every field is
//! optional, then mapped onto [`RiskAnalysis`] with defaults filled in and
//! scores clamped to range.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::model::risk::{default_risk_config, CHART_MONTHS, RISK_CATEGORIES};
use crate::model::{
    ChartPoint, Insight, InsightIcon, Recommendation, RiskAnalysis, RiskScore, SeriesStyle,
};
use crate::service::extraction::lenient_number;

#[derive(Debug, Default, Deserialize)]
pub struct RawRiskAnalysis {
    #[serde(default, rename = "riskData")]
    pub risk_data: Option<Vec<RawRiskScore>>,
    #[serde(default, rename = "insightsList")]
    pub insights_list: Option<Vec<RawInsight>>,
    #[serde(default, rename = "chartData")]
    pub chart_data: Option<Vec<RawChartPoint>>,
    #[serde(default, rename = "riskConfig")]
    pub risk_config: Option<BTreeMap<String, SeriesStyle>>,
    #[serde(default)]
    pub ai_recommendations: Option<Vec<RawRecommendation>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRiskScore {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub risk: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawInsight {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawChartPoint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "Risk", deserialize_with = "lenient_number")]
    pub risk: Option<f64>,
    #[serde(default, rename = "Average", deserialize_with = "lenient_number")]
    pub average: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRecommendation {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Round and clamp a score to 0..=100; missing scores become 0
pub fn percent(score: Option<f64>) -> u8 {
    score
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

pub fn normalize_risk_analysis(raw: RawRiskAnalysis) -> RiskAnalysis {
    let scores = raw.risk_data.unwrap_or_default();
    let risk_data = RISK_CATEGORIES
        .iter()
        .map(|category| {
            let risk = scores
                .iter()
                .find(|s| {
                    s.category
                        .as_deref()
                        .is_some_and(|c| c.trim().eq_ignore_ascii_case(category))
                })
                .and_then(|s| s.risk);
            if risk.is_none() {
                tracing::debug!(category = %category, "Risk category missing from model output");
            }
            RiskScore {
                category: category.to_string(),
                risk: percent(risk),
            }
        })
        .collect();

    let insights = raw
        .insights_list
        .unwrap_or_default()
        .into_iter()
        .map(|insight| {
            let icon = InsightIcon::resolve(insight.icon.as_deref());
            if insight.icon.as_deref().is_some_and(|name| name.parse::<InsightIcon>().is_err()) {
                tracing::debug!(icon = ?insight.icon, "Unrecognized insight icon, using default");
            }
            Insight {
                title: insight.title.unwrap_or_default(),
                description: insight.description.unwrap_or_default(),
                action: insight.action.unwrap_or_default(),
                icon,
            }
        })
        .collect();

    let points = raw.chart_data.unwrap_or_default();
    let skip = points.len().saturating_sub(CHART_MONTHS);
    let chart_data = points
        .into_iter()
        .skip(skip)
        .map(|point| ChartPoint {
            name: point.name.unwrap_or_default(),
            risk: percent(point.risk),
            average: percent(point.average),
        })
        .collect();

    let risk_config = raw
        .risk_config
        .filter(|config| !config.is_empty())
        .unwrap_or_else(default_risk_config);

    let ai_recommendations = raw
        .ai_recommendations
        .unwrap_or_default()
        .into_iter()
        .map(|r| Recommendation {
            title: r.title.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
        })
        .collect();

    RiskAnalysis {
        risk_data,
        insights,
        chart_data,
        risk_config,
        ai_recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRiskAnalysis {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_object_gets_defaults() {
        let analysis = normalize_risk_analysis(raw(json!({})));

        let categories: Vec<_> = analysis.risk_data.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, RISK_CATEGORIES);
        assert!(analysis.risk_data.iter().all(|s| s.risk == 0));
        assert!(analysis.insights.is_empty());
        assert!(analysis.chart_data.is_empty());
        assert!(analysis.ai_recommendations.is_empty());
        assert_eq!(analysis.risk_config, default_risk_config());
    }

    #[test]
    fn test_risk_data_reordered_and_completed() {
        let analysis = normalize_risk_analysis(raw(json!({
            "riskData": [
                {"category": "community trust", "risk": 12},
                {"category": "Contract Risk", "risk": 80},
                {"category": "Moon Potential", "risk": 99},
                {"category": "Contract Risk", "risk": 10}
            ]
        })));

        let scores: Vec<_> = analysis
            .risk_data
            .iter()
            .map(|s| (s.category.as_str(), s.risk))
            .collect();
        assert_eq!(
            scores,
            vec![
                ("Contract Risk", 80),
                ("Liquidity Risk", 0),
                ("Market Sentiment", 0),
                ("Developer Activity", 0),
                ("Community Trust", 12),
            ]
        );
    }

    #[test]
    fn test_string_scores_are_tolerated() {
        let analysis = normalize_risk_analysis(raw(json!({
            "riskData": [
                {"category": "Contract Risk", "risk": "45"},
                {"category": "Liquidity Risk", "risk": "high"}
            ],
            "chartData": [{"name": "Jan", "Risk": "60.4", "Average": {"value": 50}}]
        })));

        assert_eq!(analysis.risk_data[0].risk, 45);
        assert_eq!(analysis.risk_data[1].risk, 0);
        assert_eq!(analysis.chart_data[0].risk, 60);
        assert_eq!(analysis.chart_data[0].average, 0);
    }

    #[test]
    fn test_scores_are_clamped_and_rounded() {
        assert_eq!(percent(Some(150.0)), 100);
        assert_eq!(percent(Some(-3.0)), 0);
        assert_eq!(percent(Some(42.6)), 43);
        assert_eq!(percent(None), 0);
    }

    #[test]
    fn test_insight_icons_resolved() {
        let analysis = normalize_risk_analysis(raw(json!({
            "insightsList": [
                {"title": "Whales", "description": "d", "action": "On-chain", "icon": "Shield"},
                {"title": "Odd", "icon": "Rocket"},
                {"title": "None"}
            ]
        })));

        let icons: Vec<_> = analysis.insights.iter().map(|i| i.icon).collect();
        assert_eq!(
            icons,
            vec![
                InsightIcon::Shield,
                InsightIcon::AlertTriangle,
                InsightIcon::AlertTriangle
            ]
        );
        assert_eq!(analysis.insights[1].description, "");
        assert_eq!(analysis.insights[0].action, "On-chain");
    }

    #[test]
    fn test_chart_keeps_last_six_months() {
        let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug"];
        let points: Vec<_> = months
            .iter()
            .map(|m| json!({"name": m, "Risk": 50, "Average": 40}))
            .collect();
        let analysis = normalize_risk_analysis(raw(json!({ "chartData": points })));

        let names: Vec<_> = analysis.chart_data.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mar", "Apr", "May", "Jun", "Jul", "Aug"]);
    }

    #[test]
    fn test_model_risk_config_kept() {
        let analysis = normalize_risk_analysis(raw(json!({
            "riskConfig": {"Risk": {"label": "Token Risk", "color": "#000000"}}
        })));
        assert_eq!(analysis.risk_config["Risk"].label, "Token Risk");
        assert!(!analysis.risk_config.contains_key("Average"));
    }
}
