use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::backend::GenerationBackend;
use crate::error::BackendError;
use crate::prompt::gemini_response_schema;
use crate::IaServiceConfig;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Cliente REST do Gemini (`generateContent`) com saída JSON restrita ao schema
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiClient {
    pub fn new(config: &IaServiceConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(std::time::Duration::from_secs(3))
            .build()
            .map_err(|e| BackendError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens,
                "responseMimeType": "application/json",
                "responseSchema": gemini_response_schema()
            }
        })
    }

    /// Junta o texto das partes do primeiro candidato
    fn extract_text(response: &Value) -> Result<String, BackendError> {
        let parts = response
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .ok_or(BackendError::EmptyResponse)?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: Status {} - {}", status, body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json_response: Value = response.json().await?;
        Self::extract_text(&json_response)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = IaServiceConfig::new("test-key".to_string()).with_base_url(server.base_url());
        GeminiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_schema_and_returns_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-2.5-flash:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .body_contains("\"responseMimeType\":\"application/json\"")
                    .body_contains("suggested_reply");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "parts": [{ "text": "{\"category\":\"Produtivo\",\"suggested_reply\":\"Ok\"}" }]
                        }
                    }]
                }));
            })
            .await;

        let text = client_for(&server).generate("classifique").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "{\"category\":\"Produtivo\",\"suggested_reply\":\"Ok\"}");
    }

    #[tokio::test]
    async fn test_generate_maps_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("overloaded");
            })
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();

        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_without_candidates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, BackendError::EmptyResponse));
    }
}
