//! Shared LLM client and interaction utilities
//!
//! Provides a common interface for generative-AI calls used across services.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling parameters for a model call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    /// Low temperature for analytical, mostly deterministic output
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// A single prompt sent to a model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub params: Option<GenerationParams>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            params: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = Some(params);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Generative AI request failed: {0}")]
    Upstream(String),

    #[error("Generative AI returned an empty response")]
    EmptyResponse,

    #[error("Generative AI request timed out after {0:?}")]
    Timeout(Duration),
}

/// Anything that turns a prompt into free-form text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}

/// Shared LLM client wrapper
///
/// Cheap to clone; the underlying generator is shared.
#[derive(Clone)]
pub struct LlmClient {
    generator: Arc<dyn TextGenerator>,
    timeout: Option<Duration>,
}

impl LlmClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: None,
        }
    }

    /// Bound every call by `timeout`. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a prompt and return the model's text
    ///
    /// Blank responses are rejected with [`LlmError::EmptyResponse`].
    pub async fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let start_time = Instant::now();
        let prompt_length = request.prompt.len();

        tracing::debug!(
            model = %request.model,
            prompt_length = prompt_length,
            timeout = ?self.timeout,
            "Initiating generative AI call"
        );

        let call = self.generator.generate(request);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(limit)),
            },
            None => call.await,
        };

        let elapsed = start_time.elapsed();
        match result {
            Ok(text) if text.trim().is_empty() => {
                tracing::error!(
                    model = %request.model,
                    elapsed_ms = elapsed.as_millis(),
                    "Generative AI call returned no text"
                );
                Err(LlmError::EmptyResponse)
            }
            Ok(text) => {
                tracing::info!(
                    model = %request.model,
                    elapsed_ms = elapsed.as_millis(),
                    prompt_length = prompt_length,
                    response_length = text.len(),
                    "Generative AI call completed successfully"
                );
                Ok(text)
            }
            Err(e) => {
                tracing::error!(
                    model = %request.model,
                    elapsed_ms = elapsed.as_millis(),
                    prompt_length = prompt_length,
                    error = %e,
                    "Generative AI call failed"
                );
                Err(e)
            }
        }
    }
}
