//! Test doubles for the external collaborators

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::ContractSource;
use crate::service::explorer::{ContractSourceProvider, ExplorerError};
use crate::service::llm::{GenerationRequest, LlmError, TextGenerator};

/// Generator that replays a canned response and records what it was asked
pub struct StubGenerator {
    response: Result<String, String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub fn text(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone().map_err(LlmError::Upstream)
    }
}

/// Explorer that serves a fixed contract, or nothing
pub struct StubSourceProvider {
    source: Option<ContractSource>,
    lookups: Mutex<Vec<String>>,
}

impl StubSourceProvider {
    pub fn with_source(name: &str, source_code: &str) -> Self {
        Self {
            source: Some(ContractSource {
                address: String::new(),
                name: name.to_string(),
                source_code: source_code.to_string(),
                compiler: "v0.8.19+commit.7dd6d404".to_string(),
            }),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn unverified() -> Self {
        Self {
            source: None,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractSourceProvider for StubSourceProvider {
    async fn contract_source(&self, address: &str) -> Result<ContractSource, ExplorerError> {
        self.lookups.lock().unwrap().push(address.to_string());
        match &self.source {
            Some(source) => Ok(ContractSource {
                address: address.to_string(),
                ..source.clone()
            }),
            None => Err(ExplorerError::NoVerifiedSource),
        }
    }
}
