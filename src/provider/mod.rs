use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::CoachError;

pub mod gemini;
pub mod openai;

/// An opaque text-completion service: prompt in, text out.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;
    fn model(&self) -> &str;
    /// One request, no retries. May return empty text.
    async fn complete(&self, prompt: &str) -> Result<String, CoachError>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider, CoachError> {
    let api_key = cfg.api_key()?;
    match cfg.provider {
        ProviderKind::Gemini => Ok(Box::new(gemini::GeminiProvider::new(
            cfg.model.clone(),
            api_key,
            cfg.api_base.clone(),
        ))),
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            cfg.model.clone(),
            api_key,
            cfg.api_base.clone(),
        ))),
    }
}

/// Wraps a provider and turns its output into the coach's error taxonomy.
pub struct GenerationClient {
    provider: DynProvider,
}

impl GenerationClient {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, CoachError> {
        let provider = make_provider(cfg)?;
        let (name, model) = (provider.name(), provider.model());
        info!(provider = name, model, "generation service configured");
        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, CoachError> {
        debug!(provider = self.provider.name(), prompt_bytes = prompt.len(), "sending prompt");
        let text = self.provider.complete(prompt).await.map_err(|e| {
            warn!(provider = self.provider.name(), error = %e, "generation failed");
            e
        })?;
        let text = text.trim();
        if text.is_empty() {
            warn!(provider = self.provider.name(), "empty completion");
            return Err(CoachError::EmptyResponse);
        }
        debug!(completion_bytes = text.len(), "completion received");
        Ok(text.to_string())
    }
}

/// Maps a non-success HTTP status to an error. Rejected credentials are a
/// configuration problem; everything else is the service's.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> CoachError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return CoachError::Configuration(format!("{provider} rejected the API key ({status})"));
    }
    CoachError::Service(format!("{provider} API error ({status}): {}", truncate(body, 300)))
}

pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> CoachError {
    CoachError::Service(format!("{provider} request failed: {err}"))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted provider for exercising callers without a network.
    pub struct FakeProvider {
        pub reply: Result<String, CoachError>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeProvider {
        pub fn replying(text: &str) -> (Self, Arc<AtomicUsize>) {
            Self::with(Ok(text.to_string()))
        }

        pub fn failing(err: CoachError) -> (Self, Arc<AtomicUsize>) {
            Self::with(Err(err))
        }

        fn with(reply: Result<String, CoachError>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { reply, calls: calls.clone() }, calls)
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, CoachError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn generate_trims_the_completion() {
        let (fake, calls) = FakeProvider::replying("  plan text \n");
        let client = GenerationClient::new(Box::new(fake));
        assert_eq!(client.generate("p").await.unwrap(), "plan text");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn whitespace_completion_is_an_empty_response() {
        let (fake, _) = FakeProvider::replying(" \n\t ");
        let client = GenerationClient::new(Box::new(fake));
        assert_eq!(client.generate("p").await, Err(CoachError::EmptyResponse));
    }

    #[tokio::test]
    async fn provider_errors_pass_through_after_one_attempt() {
        let (fake, calls) = FakeProvider::failing(CoachError::Service("503".into()));
        let client = GenerationClient::new(Box::new(fake));
        assert_eq!(client.generate("p").await, Err(CoachError::Service("503".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_key_fails_construction() {
        let cfg = Config::default();
        assert!(matches!(GenerationClient::from_config(&cfg), Err(CoachError::Configuration(_))));
    }

    #[test]
    fn auth_statuses_are_configuration_errors() {
        assert!(matches!(
            status_error("gemini", StatusCode::UNAUTHORIZED, ""),
            CoachError::Configuration(_)
        ));
        assert!(matches!(
            status_error("openai", StatusCode::SERVICE_UNAVAILABLE, "down"),
            CoachError::Service(_)
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
