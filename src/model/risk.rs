//! Token risk analysis request and result types

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Risk categories, in the order they are always reported
pub const RISK_CATEGORIES: [&str; 5] = [
    "Contract Risk",
    "Liquidity Risk",
    "Market Sentiment",
    "Developer Activity",
    "Community Trust",
];

/// Number of monthly points kept in the risk trend chart
pub const CHART_MONTHS: usize = 6;

/// Message returned for any malformed risk analysis request
pub const INVALID_TOKEN_DATA: &str = "Invalid token data provided";

/// Raw request body, before validation
#[derive(Debug, Default, Deserialize)]
pub struct TokenRiskPayload {
    pub token_name: Option<String>,
    pub token_address: Option<String>,
    pub smart_contract_address: Option<String>,
}

/// Validated token identity submitted for risk analysis
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRiskRequest {
    pub token_name: String,
    pub token_address: String,
    pub smart_contract_address: String,
}

impl TryFrom<TokenRiskPayload> for TokenRiskRequest {
    type Error = &'static str;

    /// All three fields are required and must not be blank
    fn try_from(payload: TokenRiskPayload) -> Result<Self, Self::Error> {
        fn required(field: Option<String>) -> Result<String, &'static str> {
            match field {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(INVALID_TOKEN_DATA),
            }
        }

        Ok(Self {
            token_name: required(payload.token_name)?,
            token_address: required(payload.token_address)?,
            smart_contract_address: required(payload.smart_contract_address)?,
        })
    }
}

/// Icons an insight can be rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum InsightIcon {
    TrendingDown,
    #[default]
    AlertTriangle,
    Shield,
    BarChart3,
    FileSearch,
    Activity,
}

impl InsightIcon {
    pub const ALL: [InsightIcon; 6] = [
        InsightIcon::TrendingDown,
        InsightIcon::AlertTriangle,
        InsightIcon::Shield,
        InsightIcon::BarChart3,
        InsightIcon::FileSearch,
        InsightIcon::Activity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InsightIcon::TrendingDown => "TrendingDown",
            InsightIcon::AlertTriangle => "AlertTriangle",
            InsightIcon::Shield => "Shield",
            InsightIcon::BarChart3 => "BarChart3",
            InsightIcon::FileSearch => "FileSearch",
            InsightIcon::Activity => "Activity",
        }
    }

    /// Resolve an icon from model output, falling back to the default icon
    ///
    /// Accepts a bare name (`"Shield"`) as well as a tag the model may have
    /// echoed back (`"<Shield />"`).
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Render the icon for the presentation layer
    pub fn render(self, format: IconFormat) -> String {
        match format {
            IconFormat::Markup => {
                format!("<{} className=\"h-5 w-5 text-amber-500\" />", self.name())
            }
            IconFormat::Name => self.name().to_string(),
        }
    }
}

impl fmt::Display for InsightIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown insight icon: {0}")]
pub struct UnknownIcon(pub String);

impl FromStr for InsightIcon {
    type Err = UnknownIcon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name: String = trimmed
            .strip_prefix('<')
            .unwrap_or(trimmed)
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();

        Self::ALL
            .into_iter()
            .find(|icon| icon.name().eq_ignore_ascii_case(&name))
            .ok_or_else(|| UnknownIcon(s.to_string()))
    }
}

/// How insight icons are represented in HTTP responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconFormat {
    /// Component tag understood by the dashboard, e.g. `<Shield className="..." />`
    #[default]
    Markup,
    /// Bare icon name
    Name,
}

/// Risk score for one category, 0 (safe) to 100 (highest risk)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskScore {
    pub category: String,
    pub risk: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub action: String,
    pub icon: InsightIcon,
}

/// Monthly point on the risk trend chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    pub name: String,
    #[serde(rename = "Risk")]
    pub risk: u8,
    #[serde(rename = "Average")]
    pub average: u8,
}

/// Display metadata for one chart series
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct SeriesStyle {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
}

/// Series display metadata used when the model does not supply any
pub fn default_risk_config() -> BTreeMap<String, SeriesStyle> {
    BTreeMap::from([
        (
            "Risk".to_string(),
            SeriesStyle {
                label: "Project Risk".to_string(),
                color: "#ef4444".to_string(),
            },
        ),
        (
            "Average".to_string(),
            SeriesStyle {
                label: "Industry Average".to_string(),
                color: "#3b82f6".to_string(),
            },
        ),
    ])
}

/// Normalized risk analysis for a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// Always the five [`RISK_CATEGORIES`] in order
    pub risk_data: Vec<RiskScore>,
    pub insights: Vec<Insight>,
    pub chart_data: Vec<ChartPoint>,
    pub risk_config: BTreeMap<String, SeriesStyle>,
    pub ai_recommendations: Vec<Recommendation>,
}

/// Insight as sent to the dashboard, with the icon already rendered
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InsightView {
    pub title: String,
    pub description: String,
    pub action: String,
    pub icon: String,
}

/// Wire shape of a risk analysis response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RiskAnalysisResponse {
    #[serde(rename = "riskData")]
    pub risk_data: Vec<RiskScore>,
    #[serde(rename = "insightsList")]
    pub insights_list: Vec<InsightView>,
    #[serde(rename = "chartData")]
    pub chart_data: Vec<ChartPoint>,
    #[serde(rename = "riskConfig")]
    pub risk_config: BTreeMap<String, SeriesStyle>,
    pub ai_recommendations: Vec<Recommendation>,
}

impl RiskAnalysisResponse {
    pub fn render(analysis: RiskAnalysis, icon_format: IconFormat) -> Self {
        Self {
            risk_data: analysis.risk_data,
            insights_list: analysis
                .insights
                .into_iter()
                .map(|insight| InsightView {
                    title: insight.title,
                    description: insight.description,
                    action: insight.action,
                    icon: insight.icon.render(icon_format),
                })
                .collect(),
            chart_data: analysis.chart_data,
            risk_config: analysis.risk_config,
            ai_recommendations: analysis.ai_recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, address: &str, contract: &str) -> TokenRiskPayload {
        TokenRiskPayload {
            token_name: Some(name.to_string()),
            token_address: Some(address.to_string()),
            smart_contract_address: Some(contract.to_string()),
        }
    }

    #[test]
    fn test_valid_request() {
        let request = TokenRiskRequest::try_from(payload("FOO", "0xabc", "0xdef")).unwrap();
        assert_eq!(request.token_name, "FOO");
        assert_eq!(request.smart_contract_address, "0xdef");
    }

    #[test]
    fn test_missing_or_blank_fields_rejected() {
        let mut missing = payload("FOO", "0xabc", "0xdef");
        missing.token_address = None;
        assert_eq!(
            TokenRiskRequest::try_from(missing).unwrap_err(),
            INVALID_TOKEN_DATA
        );

        let blank = payload("FOO", "  ", "0xdef");
        assert!(TokenRiskRequest::try_from(blank).is_err());
    }

    #[test]
    fn test_icon_parsing() {
        for icon in InsightIcon::ALL {
            assert_eq!(icon.name().parse::<InsightIcon>().unwrap(), icon);
        }
        assert_eq!(
            "<Shield className=\"x\" />".parse::<InsightIcon>().unwrap(),
            InsightIcon::Shield
        );
        assert_eq!(
            " barchart3 ".parse::<InsightIcon>().unwrap(),
            InsightIcon::BarChart3
        );
        assert!("Rocket".parse::<InsightIcon>().is_err());
    }

    #[test]
    fn test_unknown_icon_falls_back_to_default() {
        assert_eq!(InsightIcon::resolve(Some("Rocket")), InsightIcon::AlertTriangle);
        assert_eq!(InsightIcon::resolve(None), InsightIcon::AlertTriangle);
        assert_eq!(InsightIcon::resolve(Some("Activity")), InsightIcon::Activity);
    }

    #[test]
    fn test_icon_rendering() {
        assert_eq!(
            InsightIcon::FileSearch.render(IconFormat::Markup),
            "<FileSearch className=\"h-5 w-5 text-amber-500\" />"
        );
        assert_eq!(InsightIcon::FileSearch.render(IconFormat::Name), "FileSearch");
    }
}
