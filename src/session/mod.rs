//! Per-session state. One `SessionStore` is created when the interactive
//! session starts and passed explicitly to every action; nothing here is
//! global or shared between sessions.

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::profile::{
    ChatRole, ChatTurn, Domain, FormSubmission, NutritionProfile, Profile, TrainingProfile,
};

pub const WATER_COUNTER: &str = "water_ml";

/// A completion and the profile it was generated from. Shared, never
/// mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub id: Uuid,
    pub domain: Domain,
    pub text: String,
    pub generated_at: DateTime<Local>,
    pub profile: Arc<Profile>,
}

impl GenerationResult {
    pub fn new(profile: Arc<Profile>, text: String, generated_at: DateTime<Local>) -> Self {
        Self { id: Uuid::new_v4(), domain: profile.kind(), text, generated_at, profile }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepEntry {
    pub date: NaiveDate,
    pub hours: f32,
    /// 1 (poor) to 5 (great)
    pub quality: u8,
}

impl SleepEntry {
    pub fn new(date: NaiveDate, hours: f32, quality: u8) -> Result<Self, ValidationError> {
        if !(0.0..=24.0).contains(&hours) {
            let msg = format!("sleep hours must be between 0 and 24 (got {hours})");
            return Err(ValidationError::Invalid(msg));
        }
        if !(1..=5).contains(&quality) {
            let msg = format!("sleep quality must be between 1 and 5 (got {quality})");
            return Err(ValidationError::Invalid(msg));
        }
        Ok(Self { date, hours, quality })
    }
}

#[derive(Debug)]
pub struct SessionStore {
    id: Uuid,
    started_at: DateTime<Local>,
    training: Option<Arc<TrainingProfile>>,
    nutrition: Option<Arc<NutritionProfile>>,
    user_profile: FormSubmission,
    history: BTreeMap<Domain, Vec<Arc<GenerationResult>>>,
    transcript: Vec<ChatTurn>,
    values: HashMap<String, Value>,
    counters: HashMap<String, i64>,
    sleep_log: Vec<SleepEntry>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Local::now(),
            training: None,
            nutrition: None,
            user_profile: FormSubmission::new(),
            history: BTreeMap::new(),
            transcript: Vec::new(),
            values: HashMap::new(),
            counters: HashMap::new(),
            sleep_log: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Returns the value under `key`, installing `default` first if absent.
    pub fn get_or_init(&mut self, key: &str, default: Value) -> &Value {
        self.values.entry(key.to_string()).or_insert(default)
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn append_history(&mut self, domain: Domain, entry: Arc<GenerationResult>) {
        self.history.entry(domain).or_default().push(entry);
    }

    pub fn history(&self, domain: Domain) -> &[Arc<GenerationResult>] {
        self.history.get(&domain).map(Vec::as_slice).unwrap_or_default()
    }

    /// The newest `n` entries, newest first.
    pub fn recent_history(&self, domain: Domain, n: usize) -> Vec<Arc<GenerationResult>> {
        self.history(domain).iter().rev().take(n).cloned().collect()
    }

    pub fn latest(&self, domain: Domain) -> Option<&Arc<GenerationResult>> {
        self.history(domain).last()
    }

    pub fn total_history(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }

    /// Adds `delta` (possibly negative) and returns the new value. Counters
    /// never go below zero.
    pub fn increment_counter(&mut self, key: &str, delta: i64) -> i64 {
        let slot = self.counters.entry(key.to_string()).or_insert(0);
        *slot = slot.saturating_add(delta).max(0);
        *slot
    }

    pub fn reset_counter(&mut self, key: &str) -> i64 {
        let current = self.counter(key);
        self.increment_counter(key, -current)
    }

    pub fn counter(&self, key: &str) -> i64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn training_profile(&self) -> Option<&Arc<TrainingProfile>> {
        self.training.as_ref()
    }

    pub fn nutrition_profile(&self) -> Option<&Arc<NutritionProfile>> {
        self.nutrition.as_ref()
    }

    pub fn set_training_profile(&mut self, p: TrainingProfile) {
        self.training = Some(Arc::new(p));
    }

    pub fn set_nutrition_profile(&mut self, p: NutritionProfile) {
        self.nutrition = Some(Arc::new(p));
    }

    /// Cumulative answers across all submitted forms, later submissions
    /// overriding earlier ones field by field.
    pub fn user_profile(&self) -> &FormSubmission {
        &self.user_profile
    }

    pub fn merge_user_profile(&mut self, resolved: &FormSubmission) {
        self.user_profile.merge(resolved);
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn push_turn(&mut self, role: ChatRole, text: impl Into<String>) {
        self.transcript.push(ChatTurn { role, text: text.into() });
    }

    pub fn log_sleep(&mut self, entry: SleepEntry) {
        self.sleep_log.push(entry);
    }

    pub fn sleep_log(&self) -> &[SleepEntry] {
        &self.sleep_log
    }

    /// Average hours over the last `n` entries.
    pub fn average_sleep(&self, n: usize) -> Option<f32> {
        let recent: Vec<f32> = self.sleep_log.iter().rev().take(n).map(|e| e.hours).collect();
        if recent.is_empty() {
            return None;
        }
        Some(recent.iter().sum::<f32>() / recent.len() as f32)
    }
}
