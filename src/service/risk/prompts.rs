//! Prompts for token risk analysis

use crate::model::risk::{InsightIcon, RISK_CATEGORIES};
use crate::model::TokenRiskRequest;

/// Target shape embedded in the prompt so the model has something concrete to imitate
const RESPONSE_TEMPLATE: &str = r##"{
  "riskData": [
    {"category": "Contract Risk", "risk": 0-100},
    {"category": "Liquidity Risk", "risk": 0-100},
    {"category": "Market Sentiment", "risk": 0-100},
    {"category": "Developer Activity", "risk": 0-100},
    {"category": "Community Trust", "risk": 0-100}
  ],
  "insightsList": [
    {"title": "Insight Title", "description": "Detailed description", "action": "Data Source", "icon": "TrendingDown"},
    ...
  ],
  "chartData": [
    {"name": "Jan", "Risk": 0-100, "Average": 0-100},
    {"name": "Feb", "Risk": 0-100, "Average": 0-100},
    ...
  ],
  "riskConfig": {
    "Risk": {"label": "Project Risk", "color": "#ef4444"},
    "Average": {"label": "Industry Average", "color": "#3b82f6"}
  },
  "ai_recommendations": [
    {"title": "Recommendation Title", "description": "Detailed recommendation"},
    ...
  ]
}"##;

/// Build the risk analysis prompt for a token
pub fn build_risk_prompt(request: &TokenRiskRequest) -> String {
    let categories = RISK_CATEGORIES
        .iter()
        .map(|c| format!("   - {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    let icons = InsightIcon::ALL
        .iter()
        .map(|icon| format!("\"{}\"", icon.name()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Perform a comprehensive risk analysis for the cryptocurrency token with the following details:

Token Name: {name}
Token Address: {address}
Smart Contract Address: {contract}

Please provide the following analysis components:

1. Risk score data for the following categories (score from 0-100, where 100 is highest risk):
{categories}

2. Five specific risk insights with descriptions

3. Historical risk trend data for the last 6 months (monthly data points)

4. Three specific AI recommendations for risk management

Format your response as a valid JSON object with the following structure:
{template}

The icon field in insightsList should be one of: {icons}.
"#,
        name = request.token_name,
        address = request.token_address,
        contract = request.smart_contract_address,
        categories = categories,
        template = RESPONSE_TEMPLATE,
        icons = icons,
    )
}
