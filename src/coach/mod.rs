//! The action chain behind every "generate" button: collect the profile,
//! build the prompt, call the service, record the result.

use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::CoachError;
use crate::log::{save_exchange, Exchange};
use crate::profile::{self, ChatPrompt, ChatRole, Domain, FormSubmission, Profile};
use crate::prompt::build_prompt;
use crate::provider::GenerationClient;
use crate::session::{GenerationResult, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Connected { provider: &'static str, model: String },
    Unavailable(String),
}

pub struct Coach {
    client: Result<GenerationClient, CoachError>,
    transcripts_dir: Option<PathBuf>,
}

impl Coach {
    /// `client` is the outcome of configuring the service; an error keeps
    /// the coach usable with generation disabled.
    pub fn new(
        client: Result<GenerationClient, CoachError>,
        transcripts_dir: Option<PathBuf>,
    ) -> Self {
        if let Err(e) = &client {
            warn!(error = %e, "generation service unavailable");
        }
        Self { client, transcripts_dir }
    }

    pub fn status(&self) -> ServiceStatus {
        match &self.client {
            Ok(c) => ServiceStatus::Connected {
                provider: c.provider_name(),
                model: c.model().to_string(),
            },
            Err(e) => ServiceStatus::Unavailable(e.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_ok()
    }

    pub fn set_client(&mut self, client: GenerationClient) {
        info!(provider = client.provider_name(), "generation service connected");
        self.client = Ok(client);
    }

    fn client(&self) -> Result<&GenerationClient, CoachError> {
        self.client.as_ref().map_err(|e| e.clone())
    }

    /// Validates a form submission and generates a plan from it.
    ///
    /// Validation and configuration failures leave the session untouched.
    /// Once validation passes the profile becomes the domain's current
    /// profile, so a service failure can be retried with [`Coach::regenerate`].
    pub async fn submit_plan(
        &mut self,
        session: &mut SessionStore,
        domain: Domain,
        raw: &FormSubmission,
    ) -> Result<Arc<GenerationResult>, CoachError> {
        self.client()?;
        let (profile, resolved) = profile::collect(domain, raw)?;
        match &profile {
            Profile::Training(p) => session.set_training_profile(p.clone()),
            Profile::Nutrition(p) => session.set_nutrition_profile(p.clone()),
            Profile::Chat(_) => {}
        }
        session.merge_user_profile(&resolved);
        info!(domain = domain.slug(), "profile accepted");
        self.run(session, profile).await
    }

    /// Generates again from the domain's current profile.
    pub async fn regenerate(
        &mut self,
        session: &mut SessionStore,
        domain: Domain,
    ) -> Result<Arc<GenerationResult>, CoachError> {
        self.client()?;
        let profile = match domain {
            Domain::Training => {
                session.training_profile().map(|p| Profile::Training((**p).clone()))
            }
            Domain::Nutrition => {
                session.nutrition_profile().map(|p| Profile::Nutrition((**p).clone()))
            }
            Domain::Chat => None,
        };
        let profile = profile.ok_or_else(|| {
            CoachError::Validation(crate::errors::ValidationError::Invalid(format!(
                "No {} data found. Please fill out the form first.",
                domain.slug()
            )))
        })?;
        self.run(session, profile).await
    }

    /// Free-form question with the session's profiles and recent turns as
    /// context. Both turns are recorded only if the service answers.
    pub async fn ask(
        &mut self,
        session: &mut SessionStore,
        message: &str,
    ) -> Result<Arc<GenerationResult>, CoachError> {
        self.client()?;
        let chat = ChatPrompt::new(
            message,
            session.training_profile().map(|p| (**p).clone()),
            session.nutrition_profile().map(|p| (**p).clone()),
            session.transcript(),
        )?;
        let question = chat.message.clone();
        let result = self.run(session, Profile::Chat(chat)).await?;
        session.push_turn(ChatRole::User, question);
        session.push_turn(ChatRole::Coach, result.text.clone());
        Ok(result)
    }

    /// A credential the service rejects disables generation for the rest of
    /// the session, same as a missing one.
    async fn run(
        &mut self,
        session: &mut SessionStore,
        profile: Profile,
    ) -> Result<Arc<GenerationResult>, CoachError> {
        let outcome = self.generate_and_record(session, profile).await;
        if let Err(e) = &outcome {
            if e.is_persistent() {
                warn!(error = %e, "generation disabled");
                self.client = Err(e.clone());
            }
        }
        outcome
    }

    async fn generate_and_record(
        &self,
        session: &mut SessionStore,
        profile: Profile,
    ) -> Result<Arc<GenerationResult>, CoachError> {
        let client = self.client()?;
        let domain = profile.kind();
        let prompt = build_prompt(&profile);
        let text = client.generate(&prompt).await?;

        let result = Arc::new(GenerationResult::new(Arc::new(profile), text, Local::now()));
        session.append_history(domain, result.clone());
        info!(domain = domain.slug(), result = %result.id, "plan recorded");

        if let Some(dir) = &self.transcripts_dir {
            let ex = Exchange {
                seq: session.total_history(),
                domain,
                provider: client.provider_name(),
                model: client.model(),
                prompt: &prompt,
                result_id: result.id,
                generated_at: result.generated_at,
                completion: &result.text,
            };
            match save_exchange(dir, session.id(), &ex) {
                Ok(saved) => debug!(
                    request = %saved.request.display(),
                    response = %saved.response.display(),
                    "transcript saved"
                ),
                Err(e) => warn!(error = %e, "could not save transcript"),
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use crate::profile::FieldValue;
    use crate::provider::tests::FakeProvider;
    use std::sync::atomic::Ordering;

    fn coach_with(fake: FakeProvider) -> Coach {
        Coach::new(Ok(GenerationClient::new(Box::new(fake))), None)
    }

    fn nutrition_form(equipment: &[&str]) -> FormSubmission {
        FormSubmission::new()
            .with("age", FieldValue::Int(34))
            .with(
                "kitchen_equipment",
                FieldValue::List(equipment.iter().map(|s| s.to_string()).collect()),
            )
    }

    #[tokio::test]
    async fn successful_submission_records_profile_and_history() {
        let (fake, calls) = FakeProvider::replying("Your plan");
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();

        let form = nutrition_form(&["Blender"]);
        let result = coach.submit_plan(&mut session, Domain::Nutrition, &form).await.unwrap();

        assert_eq!(result.text, "Your plan");
        assert_eq!(result.domain, Domain::Nutrition);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.nutrition_profile().unwrap().age, 34);
        assert!(Arc::ptr_eq(session.latest(Domain::Nutrition).unwrap(), &result));
        assert_eq!(session.user_profile().get("age"), Some(&FieldValue::Int(34)));
    }

    #[tokio::test]
    async fn missing_kitchen_equipment_never_reaches_the_service() {
        let (fake, calls) = FakeProvider::replying("unused");
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();

        let form = nutrition_form(&[]);
        let err = coach.submit_plan(&mut session, Domain::Nutrition, &form).await.unwrap_err();

        assert!(matches!(
            err,
            CoachError::Validation(ValidationError::MissingSelection {
                field: "kitchen_equipment",
                ..
            })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(session.nutrition_profile().is_none());
        assert!(session.user_profile().is_empty());
        assert_eq!(session.total_history(), 0);
    }

    #[tokio::test]
    async fn service_failure_keeps_the_profile_and_skips_history() {
        let down = CoachError::Service("service unavailable".into());
        let (fake, calls) = FakeProvider::failing(down);
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();

        let blank = FormSubmission::new();
        let err = coach.submit_plan(&mut session, Domain::Training, &blank).await.unwrap_err();

        assert_eq!(err, CoachError::Service("service unavailable".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(session.training_profile().is_some());
        assert!(session.history(Domain::Training).is_empty());
    }

    #[tokio::test]
    async fn empty_completion_is_reported_and_not_recorded() {
        let (fake, _) = FakeProvider::replying("   ");
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();
        let blank = FormSubmission::new();
        let err = coach.submit_plan(&mut session, Domain::Training, &blank).await.unwrap_err();
        assert_eq!(err, CoachError::EmptyResponse);
        assert_eq!(session.total_history(), 0);
    }

    #[tokio::test]
    async fn unavailable_service_rejects_without_touching_state() {
        let mut coach = Coach::new(Err(CoachError::Configuration("no key".into())), None);
        let mut session = SessionStore::new();
        let blank = FormSubmission::new();
        let err = coach.submit_plan(&mut session, Domain::Training, &blank).await.unwrap_err();
        assert!(err.is_persistent());
        assert!(session.training_profile().is_none());
        assert!(matches!(coach.status(), ServiceStatus::Unavailable(_)));
    }

    #[tokio::test]
    async fn rejected_key_disables_generation() {
        let rejected = CoachError::Configuration("the service rejected the API key (401)".into());
        let (fake, calls) = FakeProvider::failing(rejected);
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();

        let blank = FormSubmission::new();
        let first = coach.submit_plan(&mut session, Domain::Training, &blank).await.unwrap_err();
        assert!(first.is_persistent());
        assert!(!coach.is_available());
        let status = coach.status();
        assert!(matches!(
            status,
            ServiceStatus::Unavailable(m) if m.contains("rejected the API key")
        ));

        let second = coach.regenerate(&mut session, Domain::Training).await.unwrap_err();
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn service_errors_leave_generation_enabled() {
        let (fake, _) = FakeProvider::failing(CoachError::Service("HTTP 503".into()));
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();
        assert!(coach.ask(&mut session, "hi").await.is_err());
        assert!(coach.is_available());
    }

    #[tokio::test]
    async fn regenerate_reuses_the_current_profile() {
        let (fake, calls) = FakeProvider::replying("again");
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();

        assert!(matches!(
            coach.regenerate(&mut session, Domain::Training).await,
            Err(CoachError::Validation(_))
        ));

        coach.submit_plan(&mut session, Domain::Training, &FormSubmission::new()).await.unwrap();
        let second = coach.regenerate(&mut session, Domain::Training).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.history(Domain::Training).len(), 2);
        assert_eq!(second.profile, session.history(Domain::Training)[0].profile);
    }

    #[tokio::test]
    async fn chat_records_both_turns_on_success() {
        let (fake, _) = FakeProvider::replying("Drink water.");
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();

        let r = coach.ask(&mut session, "  what should I drink? ").await.unwrap();
        assert_eq!(r.domain, Domain::Chat);
        let turns = session.transcript();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[0].text, "what should I drink?");
        assert_eq!(turns[1].text, "Drink water.");
    }

    #[tokio::test]
    async fn failed_chat_leaves_the_transcript_alone() {
        let (fake, _) = FakeProvider::failing(CoachError::Service("down".into()));
        let mut coach = coach_with(fake);
        let mut session = SessionStore::new();
        assert!(coach.ask(&mut session, "hello").await.is_err());
        assert!(session.transcript().is_empty());
        assert!(coach.ask(&mut session, "   ").await.is_err());
    }

    #[tokio::test]
    async fn transcripts_are_saved_when_configured() {
        let tmp = tempfile::tempdir().unwrap();
        let (fake, _) = FakeProvider::replying("plan");
        let client = GenerationClient::new(Box::new(fake));
        let mut coach = Coach::new(Ok(client), Some(tmp.path().to_path_buf()));
        let mut session = SessionStore::new();
        coach.submit_plan(&mut session, Domain::Training, &FormSubmission::new()).await.unwrap();
        let dir = tmp.path().join(session.id().to_string());
        assert!(dir.join("001-training.request.json").exists());
        assert!(dir.join("001-training.response.json").exists());
    }
}
