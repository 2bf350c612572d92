use std::env;
use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, eyre};
use serde_json::{json, Value};
use tracing::{error, debug, info};

use crate::cli::chat::tutor::{TextGenerator, UpstreamError};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiClient {
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Builds a client from `GEMINI_API_KEY` and the optional `GEMINI_MODEL`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| eyre!("GEMINI_API_KEY environment variable not set"))?;
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        info!("Using Gemini model {}", model);

        Ok(Self {
            api_key,
            model,
            timeout,
            client,
        })
    }

    pub async fn generate_content(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> std::result::Result<String, UpstreamError> {
        let api_url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request_body = json!({
            "systemInstruction": {
                "parts": [
                    {
                        "text": system_prompt
                    }
                ]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {
                            "text": user_prompt
                        }
                    ]
                }
            ],
            "generationConfig": {
                "temperature": 0.2,
                "topP": 0.8,
                "topK": 40,
                "maxOutputTokens": 1024
            }
        });

        debug!("Sending request to Gemini API: {}", request_body);

        let response = self
            .client
            .post(&api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            error!("API request failed with status {}: {}", status, body);
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await.map_err(|e| self.transport_error(e))?;

        debug!("Received response from Gemini API: {}", response_json);

        extract_text(&response_json)
    }

    fn transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            error!("Gemini request timed out after {:?}", self.timeout);
            UpstreamError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            error!("Gemini request failed: {}", e);
            UpstreamError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> std::result::Result<String, UpstreamError> {
        self.generate_content(system_prompt, user_prompt).await
    }
}

/// Stand-in used when no API key is configured: every request fails, so the
/// tutor still works for everything it can explain with pictures.
pub struct UnconfiguredGenerator {
    pub reason: String,
}

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> std::result::Result<String, UpstreamError> {
        Err(UpstreamError::NotConfigured(self.reason.clone()))
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(response_json: &Value) -> std::result::Result<String, UpstreamError> {
    let parts = response_json
        .get("candidates")
        .and_then(|candidates| candidates.as_array())
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array());

    let Some(parts) = parts else {
        info!("Could not find any candidate text in the Gemini response");
        return Err(UpstreamError::EmptyResponse);
    };

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(UpstreamError::EmptyResponse);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let response = json!({
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "First, count 3. " },
                            { "text": "Then count 2 more." }
                        ]
                    },
                    "finishReason": "STOP"
                }
            ]
        });
        assert_eq!(
            extract_text(&response).unwrap(),
            "First, count 3. Then count 2 more."
        );
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            extract_text(&response),
            Err(UpstreamError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_text_with_blank_text() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        });
        assert!(matches!(
            extract_text(&response),
            Err(UpstreamError::EmptyResponse)
        ));
    }

    #[test]
    fn test_transport_error_keeps_message() {
        let client = GeminiClient {
            api_key: "key".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(5),
            client: reqwest::Client::new(),
        };
        let err = client.client.get("not a url").build().unwrap_err();
        let message = err.to_string();

        match client.transport_error(err) {
            UpstreamError::Transport(text) => assert_eq!(text, message),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_generator_always_fails() {
        let generator = UnconfiguredGenerator {
            reason: "GEMINI_API_KEY environment variable not set".to_string(),
        };
        let result = generator.generate("system", "user").await;
        assert!(matches!(result, Err(UpstreamError::NotConfigured(_))));
    }
}
