//! Blockchain explorer client
//!
//! Fetches verified contract source code from an Etherscan-compatible API.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::model::etherscan::{EtherscanResponse, EtherscanSourceEntry};
use crate::model::{ApiKey, ContractSource};

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[source] reqwest::Error),

    #[error("Etherscan API error: {0}")]
    Api(String),

    #[error("No verified source code available for this contract")]
    NoVerifiedSource,

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for ExplorerError {
    /// Request URLs carry the API key, so they are stripped from the error
    fn from(err: reqwest::Error) -> Self {
        ExplorerError::HttpError(err.without_url())
    }
}

/// Source of verified contract code
#[async_trait]
pub trait ContractSourceProvider: Send + Sync {
    async fn contract_source(&self, address: &str) -> Result<ContractSource, ExplorerError>;
}

/// Client for the Etherscan contract API
pub struct EtherscanClient {
    client: Client,
    base_url: Url,
    api_key: ApiKey,
}

impl EtherscanClient {
    pub fn new(base_url: Url, api_key: ApiKey) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl ContractSourceProvider for EtherscanClient {
    async fn contract_source(&self, address: &str) -> Result<ContractSource, ExplorerError> {
        tracing::debug!(address = %address, "Fetching contract source from Etherscan");

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
                ("apikey", self.api_key.expose()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExplorerError::ParseError(format!(
                "Unexpected status {}",
                response.status()
            )));
        }

        let envelope: EtherscanResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::ParseError(e.without_url().to_string()))?;

        if envelope.status != "1" {
            let detail = match envelope.result.as_str() {
                Some(result) if !result.is_empty() => format!("{} ({})", envelope.message, result),
                _ if envelope.message.is_empty() => "Unknown error".to_string(),
                _ => envelope.message,
            };
            tracing::warn!(address = %address, detail = %detail, "Etherscan returned an error status");
            return Err(ExplorerError::Api(detail));
        }

        let entries: Vec<EtherscanSourceEntry> = serde_json::from_value(envelope.result)
            .map_err(|e| ExplorerError::ParseError(format!("Unexpected result shape: {}", e)))?;

        let entry = entries
            .into_iter()
            .next()
            .filter(|e| !e.source_code.trim().is_empty())
            .ok_or(ExplorerError::NoVerifiedSource)?;

        tracing::debug!(
            address = %address,
            contract_name = %entry.contract_name,
            compiler = %entry.compiler_version,
            source_length = entry.source_code.len(),
            "Fetched verified contract source"
        );

        Ok(ContractSource {
            address: address.to_string(),
            name: entry.contract_name,
            source_code: entry.source_code,
            compiler: entry.compiler_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ADDRESS: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

    fn client(server: &MockServer) -> EtherscanClient {
        EtherscanClient::new(Url::parse(&server.uri()).unwrap(), ApiKey::new("scan-key"))
    }

    async fn respond_with(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("module", "contract"))
            .and(query_param("action", "getsourcecode"))
            .and(query_param("address", ADDRESS))
            .and(query_param("apikey", "scan-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetches_verified_source() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            json!({
                "status": "1",
                "message": "OK",
                "result": [{
                    "SourceCode": "pragma solidity ^0.4.17; contract TetherToken {}",
                    "ContractName": "TetherToken",
                    "CompilerVersion": "v0.4.18+commit.9cf6e910",
                    "OptimizationUsed": "0"
                }]
            }),
        )
        .await;

        let source = client(&server).contract_source(ADDRESS).await.unwrap();

        assert_eq!(source.address, ADDRESS);
        assert_eq!(source.name, "TetherToken");
        assert_eq!(source.compiler, "v0.4.18+commit.9cf6e910");
        assert!(source.source_code.contains("contract TetherToken"));
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"}),
        )
        .await;

        let err = client(&server).contract_source(ADDRESS).await.unwrap_err();

        assert!(matches!(err, ExplorerError::Api(_)));
        assert_eq!(err.to_string(), "Etherscan API error: NOTOK (Invalid API Key)");
    }

    #[tokio::test]
    async fn test_unverified_contract() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            json!({
                "status": "1",
                "message": "OK",
                "result": [{"SourceCode": "", "ContractName": "", "CompilerVersion": ""}]
            }),
        )
        .await;

        let err = client(&server).contract_source(ADDRESS).await.unwrap_err();
        assert!(matches!(err, ExplorerError::NoVerifiedSource));
    }

    #[tokio::test]
    async fn test_empty_result_list_is_unverified() {
        let server = MockServer::start().await;
        respond_with(&server, json!({"status": "1", "message": "OK", "result": []})).await;

        let err = client(&server).contract_source(ADDRESS).await.unwrap_err();
        assert!(matches!(err, ExplorerError::NoVerifiedSource));
    }
}
