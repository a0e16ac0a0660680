//! Mistral chat-completion client.
//!
//! Talks to the Mistral `chat/completions` endpoint with a bearer key.
//! Every failure mode folds into the returned string: a missing key yields
//! a placeholder, API and transport errors an `Error: ...` message, an
//! empty choice list "No response generated".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CompletionClient, DEFAULT_SYSTEM_PROMPT};
use crate::config::CompletionSettings;

const MISTRAL_API_BASE: &str = "https://api.mistral.ai/v1";
const DEFAULT_MODEL: &str = "mistral-small-latest";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MISSING_KEY_PLACEHOLDER: &str =
    "\u{26a0}\u{fe0f} API key not configured. Please set MISTRAL_API_KEY in your environment.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: Option<String>,
}

/// Mistral API client.
pub struct MistralClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl MistralClient {
    /// Creates a client from completion settings.
    pub fn new(settings: &CompletionSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: MISTRAL_API_BASE.to_string(),
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Overrides the API base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_request(&self, prompt: &str, system_prompt: Option<&str>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT).to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

#[async_trait]
impl CompletionClient for MistralClient {
    async fn ask(&self, prompt: &str, system_prompt: Option<&str>) -> String {
        let Some(key) = self.api_key.as_deref() else {
            tracing::warn!("no Mistral API key configured, returning placeholder");
            return MISSING_KEY_PLACEHOLDER.to_string();
        };

        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(prompt, system_prompt);

        let response = match self
            .client
            .post(&url)
            .bearer_auth(key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "Mistral request failed");
                return format!("Error: {}", error);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Mistral API request failed".to_string());
            tracing::error!(%status, %message, "Mistral API rejected request");
            return format!("Error: {}", message);
        }

        let completion: ChatResponse = match response.json().await {
            Ok(completion) => completion,
            Err(error) => {
                tracing::error!(%error, "undecodable Mistral response");
                return format!("Error: {}", error);
            }
        };

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_else(|| "No response generated".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_key() -> MistralClient {
        MistralClient::new(&CompletionSettings::default())
    }

    #[test]
    fn request_shape_matches_api() {
        let client = client_without_key();
        let request = client.build_request("Draft a reply", None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "mistral-small-latest");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], DEFAULT_SYSTEM_PROMPT);
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Draft a reply");
    }

    #[test]
    fn custom_system_prompt_replaces_default() {
        let request = client_without_key().build_request("hi", Some("Be terse."));
        assert_eq!(request.messages[0].content, "Be terse.");
    }

    #[test]
    fn empty_key_counts_as_unconfigured() {
        let settings = CompletionSettings {
            api_key: Some(String::new()),
        };
        assert!(MistralClient::new(&settings).api_key.is_none());
    }

    #[tokio::test]
    async fn missing_key_yields_placeholder() {
        let answer = client_without_key().ask("anything", None).await;
        assert!(answer.contains("API key not configured"));
    }
}
