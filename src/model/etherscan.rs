//! Etherscan contract API response models
//!
//! Based on `module=contract&action=getsourcecode`: https://docs.etherscan.io/api-endpoints/contracts

use serde::{Deserialize, Serialize};

/// Envelope returned by every Etherscan API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtherscanResponse {
    /// "1" on success, "0" on failure
    pub status: String,

    /// "OK" or "NOTOK"
    #[serde(default)]
    pub message: String,

    /// List of source entries on success; an error string on failure
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Verified source entry for a contract
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EtherscanSourceEntry {
    /// Empty when the contract has no verified source
    #[serde(default)]
    pub source_code: String,

    #[serde(default)]
    pub contract_name: String,

    #[serde(default)]
    pub compiler_version: String,
}
