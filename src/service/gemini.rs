//! Gemini generative-AI client
//!
//! Calls the `generateContent` REST endpoint of the Generative Language API.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::model::gemini::{
    Content, GeminiErrorResponse, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig,
};
use crate::model::ApiKey;
use crate::service::llm::{GenerationRequest, LlmError, TextGenerator};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` API
pub struct GeminiClient {
    client: Client,
    base_url: Url,
    api_key: ApiKey,
}

impl GeminiClient {
    pub fn new(base_url: Url, api_key: ApiKey) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            model
        )
    }

    fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(Some("user"), &request.prompt)],
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(|text| Content::text(None, text)),
            generation_config: request.params.map(|p| GenerationConfig {
                temperature: p.temperature,
                top_p: p.top_p,
                top_k: p.top_k,
                max_output_tokens: p.max_output_tokens,
            }),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let url = self.endpoint(&request.model);

        tracing::debug!(model = %request.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| LlmError::Upstream(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map(|e| format!("{} ({})", e.error.message, e.error.status))
                .unwrap_or_else(|_| format!("Unexpected status {}", status));
            return Err(LlmError::Upstream(message));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::Upstream(format!("Failed to deserialize response: {}", e.without_url()))
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(LlmError::Upstream(format!("Prompt blocked: {}", reason)));
        }

        match parsed.text() {
            Some(text) => Ok(text),
            None => {
                tracing::warn!(
                    model = %request.model,
                    finish_reason = ?parsed.candidates.first().and_then(|c| c.finish_reason.clone()),
                    "generateContent returned no candidate text"
                );
                Err(LlmError::EmptyResponse)
            }
        }
    }
}
