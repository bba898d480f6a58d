use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{OracleError, PromptRequest, TextOracle};
use crate::config::OracleConfig;

/// Chat-completions client for OpenAI and API-compatible endpoints.
pub struct OpenAiOracle {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAiOracle {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, OracleError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OracleError::NotConfigured("ORACLE_API_KEY"));
        }

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: "https://api.openai.com".to_string(),
            model: model.into(),
            http_client,
        })
    }

    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(OracleError::NotConfigured("ORACLE_API_KEY"))?;
        Ok(Self::new(api_key, config.model.clone(), config.timeout)?
            .with_base_url(config.base_url.clone()))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn chat_request(&self, request: PromptRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.user_prompt,
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl TextOracle for OpenAiOracle {
    async fn generate(&self, request: PromptRequest) -> Result<String, OracleError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let purpose = request.purpose;
        let body = self.chat_request(request);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(OracleError::EmptyResponse)?;

        debug!(purpose = purpose.label(), chars = content.len(), "oracle answered");
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::coaching::oracle::PromptPurpose;
    use std::time::Duration;

    fn request() -> PromptRequest {
        PromptRequest {
            purpose: PromptPurpose::Rating,
            system_prompt: Some("You rate coaching feedback.".to_string()),
            user_prompt: "Category: Teamwork".to_string(),
            temperature: 0.3,
        }
    }

    #[test]
    fn rejects_blank_api_key() {
        assert!(matches!(
            OpenAiOracle::new("  ", "gpt-3.5-turbo", Duration::from_secs(5)),
            Err(OracleError::NotConfigured("ORACLE_API_KEY"))
        ));
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"  Rating: 4/5\nSummary: Reliable.  "}}]}"#,
            )
            .create_async()
            .await;

        let oracle = OpenAiOracle::new("sk-test", "gpt-3.5-turbo", Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.url());

        let content = oracle.generate(request()).await.expect("completion");
        assert_eq!(content, "Rating: 4/5\nSummary: Reliable.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_error_envelopes_to_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
            .create_async()
            .await;

        let oracle = OpenAiOracle::new("sk-test", "gpt-3.5-turbo", Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.url());

        match oracle.generate(request()).await {
            Err(OracleError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_are_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let oracle = OpenAiOracle::new("sk-test", "gpt-3.5-turbo", Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.url());

        assert!(matches!(
            oracle.generate(request()).await,
            Err(OracleError::EmptyResponse)
        ));
    }
}
