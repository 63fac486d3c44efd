//! Google Gemini `generateContent` backend.
//!
//! - Request: `{ contents: [{ parts: [{ text }] }] }`, API key in the `x-goog-api-key` header.
//! - Response: `candidates[0].content.parts[*].text`, usage in `usageMetadata.totalTokenCount`.

use crate::domain::Generated;
use crate::ports::TextGenerator;
use async_trait::async_trait;
use serde_json::Value;
use shared::config::GeminiConfig;
use shared::{Error, Result, TokenCount};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Fails with [`Error::BackendUnconfigured`] when no API key is set.
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::BackendUnconfigured)?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Pull the generated text and token usage out of a response body.
    pub fn parse_response(body: &Value) -> Result<Generated<String>> {
        let text = body
            .pointer("/candidates/0/content/parts")
            .and_then(|parts| parts.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = body
                .pointer("/candidates/0/finishReason")
                .or_else(|| body.pointer("/promptFeedback/blockReason"))
                .and_then(|r| r.as_str())
                .unwrap_or("no candidates");
            return Err(Error::Generation(format!(
                "Response contained no text ({})",
                reason
            )));
        }

        let tokens = body
            .pointer("/usageMetadata/totalTokenCount")
            .and_then(|t| t.as_u64())
            .unwrap_or(0);

        Ok(Generated::new(text, TokenCount(tokens)))
    }
}

#[async_trait]
impl TextGenerator for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<Generated<String>> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                Error::Generation(format!("Request to Gemini failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "Gemini returned {}: {}",
                status, detail
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| {
                Error::Generation(format!(
                    "Failed to decode Gemini response: {}",
                    e.without_url()
                ))
            })?;

        Self::parse_response(&payload)
    }
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
