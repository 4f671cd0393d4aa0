//! Generative-language providers for summaries, answers, and insights.

use crate::error::StashError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// A model that turns an assembled prompt into prose
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: String) -> Result<String, StashError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Google generative-language provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                panic!("Failed to initialize HTTP client: {}", e);
            });
        Self {
            client,
            api_key,
            model: "gemini-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(level = "debug", skip(self, prompt), fields(model = %self.model), err)]
    async fn generate(&self, prompt: String) -> Result<String, StashError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let request_body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| StashError::FetchError(e.to_string()))?;

        // A 404 here means the named model does not exist for this key;
        // callers surface that differently from a flaky upstream.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StashError::ModelUnavailable(self.model.clone()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StashError::ExternalServiceError {
                service: "Gemini".to_string(),
                message: format!("API error ({}): {}", status, error_text),
            });
        }

        let response_json: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| StashError::ExternalServiceError {
                    service: "Gemini".to_string(),
                    message: format!("Invalid response: {}", e),
                })?;

        let text: String = response_json
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(StashError::ExternalServiceError {
                service: "Gemini".to_string(),
                message: "No content in response".to_string(),
            });
        }

        debug!(chars = text.len(), "Generated response");
        Ok(text)
    }
}

#[derive(Debug, Clone)]
enum ScriptedOutcome {
    Text(String),
    ModelMissing(String),
    Unreachable(String),
}

/// Scripted provider for tests: returns a fixed response or a fixed
/// failure, and records every prompt it is handed.
pub struct ScriptedProvider {
    outcome: ScriptedOutcome,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            outcome: ScriptedOutcome::Text(response.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn model_missing(model: impl Into<String>) -> Self {
        Self {
            outcome: ScriptedOutcome::ModelMissing(model.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            outcome: ScriptedOutcome::Unreachable(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: String) -> Result<String, StashError> {
        self.prompts.lock().unwrap().push(prompt);
        match &self.outcome {
            ScriptedOutcome::Text(text) => Ok(text.clone()),
            ScriptedOutcome::ModelMissing(model) => {
                Err(StashError::ModelUnavailable(model.clone()))
            }
            ScriptedOutcome::Unreachable(message) => Err(StashError::ExternalServiceError {
                service: "Gemini".to_string(),
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_provider_replays_and_records() {
        let provider = ScriptedProvider::new("a fine summary");
        let out = provider.generate("prompt one".into()).await.unwrap();
        assert_eq!(out, "a fine summary");
        assert_eq!(provider.prompts(), vec!["prompt one".to_string()]);
    }

    #[tokio::test]
    async fn scripted_failures_are_distinguishable() {
        let missing = ScriptedProvider::model_missing("gemini-pro");
        let err = missing.generate("p".into()).await.unwrap_err();
        assert!(matches!(err, StashError::ModelUnavailable(m) if m == "gemini-pro"));

        let down = ScriptedProvider::unreachable("connection reset");
        let err = down.generate("p".into()).await.unwrap_err();
        assert!(matches!(err, StashError::ExternalServiceError { .. }));
    }

    #[test]
    fn response_parsing_joins_parts() {
        let raw = r#"{
            "candidates": [{
                "content": { "parts": [{"text": "Hello "}, {"text": "world"}] }
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "Hello world");
    }
}
