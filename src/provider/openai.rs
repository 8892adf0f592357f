use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{status_error, transport_error, Provider};
use crate::errors::CoachError;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// OpenAI-compatible chat completions; the prompt goes out as a single user
/// message.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(model: String, api_key: String, api_base: Option<String>) -> Self {
        Self {
            model,
            api_key,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client: Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, CoachError> {
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.7
        });
        debug!(%url, "POST chat/completions");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("openai", e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error("openai", e))?;
        debug!(%status, bytes = text.len(), "openai response");
        parse_response(status, &text)
    }
}

fn parse_response(status: StatusCode, body: &str) -> Result<String, CoachError> {
    if !status.is_success() {
        return Err(status_error("openai", status, body));
    }
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CoachError::Service(format!("failed to parse openai response: {e}")))?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_first_choice() {
        let body = r#"{"choices":[
            {"index":0,"message":{"role":"assistant","content":"Eat more greens."}}
        ]}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "Eat more greens.");
    }

    #[test]
    fn null_content_or_no_choices_is_empty_text() {
        assert_eq!(parse_response(StatusCode::OK, r#"{"choices":[]}"#).unwrap(), "");
        let null = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_response(StatusCode::OK, null).unwrap(), "");
    }

    #[test]
    fn unauthorized_is_a_configuration_error() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        let err = parse_response(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, Err(CoachError::Configuration(_))));
    }

    #[test]
    fn rate_limit_is_a_service_error() {
        assert!(matches!(
            parse_response(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            Err(CoachError::Service(m)) if m.contains("429")
        ));
    }
}
