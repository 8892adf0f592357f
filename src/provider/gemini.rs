use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{status_error, transport_error, Provider};
use crate::errors::CoachError;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini `generateContent`.
pub struct GeminiProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(model: String, api_key: String, api_base: Option<String>) -> Self {
        Self {
            model,
            api_key,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client: Client::new(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, CoachError> {
        let url = self.url();
        let body = GenerateRequest {
            contents: vec![Content { role: "user", parts: vec![Part { text: prompt }] }],
        };
        debug!(%url, "POST generateContent");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("gemini", e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error("gemini", e))?;
        debug!(%status, bytes = text.len(), "gemini response");
        parse_response(status, &text)
    }
}

/// Concatenates the text parts of the first candidate. A response with no
/// candidates is only an error if the prompt was blocked; otherwise it is
/// empty text and the caller decides.
fn parse_response(status: StatusCode, body: &str) -> Result<String, CoachError> {
    if status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID") {
        let msg = "gemini rejected the API key (API_KEY_INVALID)";
        return Err(CoachError::Configuration(msg.into()));
    }
    if !status.is_success() {
        return Err(status_error("gemini", status, body));
    }
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CoachError::Service(format!("failed to parse gemini response: {e}")))?;

    if parsed.candidates.is_empty() {
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CoachError::Service(format!("gemini blocked the prompt ({reason})")));
        }
        return Ok(String::new());
    }

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
        .unwrap_or_default();
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_the_first_candidate_parts() {
        let body = r###"{"candidates":[
            {
                "content":{"role":"model","parts":[{"text":"## Week 1\n"},{"text":"Squats"}]},
                "finishReason":"STOP"
            },
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"###;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "## Week 1\nSquats");
    }

    #[test]
    fn no_candidates_is_empty_text() {
        assert_eq!(parse_response(StatusCode::OK, "{}").unwrap(), "");
        let no_content = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert_eq!(parse_response(StatusCode::OK, no_content).unwrap(), "");
    }

    #[test]
    fn blocked_prompt_is_a_service_error() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = parse_response(StatusCode::OK, body);
        assert!(matches!(err, Err(CoachError::Service(m)) if m.contains("SAFETY")));
    }

    #[test]
    fn invalid_key_is_a_configuration_error() {
        let body = r#"{"error":{
            "code":400,"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]
        }}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, Err(CoachError::Configuration(_))));
    }

    #[test]
    fn server_errors_and_garbage_are_service_errors() {
        assert!(matches!(
            parse_response(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            Err(CoachError::Service(_))
        ));
        assert!(matches!(parse_response(StatusCode::OK, "<html>"), Err(CoachError::Service(_))));
    }

    #[test]
    fn url_uses_model_and_trims_base() {
        let base = Some("http://localhost:8080/".into());
        let p = GeminiProvider::new("gemini-pro".into(), "k".into(), base);
        assert_eq!(p.url(), "http://localhost:8080/v1beta/models/gemini-pro:generateContent");
    }
}
