//! Profile collection: form schemas, raw submissions and the typed
//! profiles built from them.
//!
//! A form is a fixed list of sections, each a fixed list of fields. A raw
//! [`FormSubmission`] is checked against the schema by [`FormSpec::resolve`],
//! which fills defaults, canonicalizes choice spellings and enforces
//! requiredness. Typed profiles are only ever built from a resolved
//! submission, so a `TrainingProfile` or `NutritionProfile` in hand is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ValidationError;

pub mod chat;
pub mod nutrition;
pub mod training;

pub use chat::{ChatPrompt, ChatRole, ChatTurn};
pub use nutrition::{NutritionProfile, NUTRITION_FORM};
pub use training::{TrainingProfile, TRAINING_FORM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Training,
    Nutrition,
    Chat,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Training, Domain::Nutrition, Domain::Chat];

    pub fn slug(self) -> &'static str {
        match self {
            Domain::Training => "training",
            Domain::Nutrition => "nutrition",
            Domain::Chat => "chat",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Domain::Training => "Training",
            Domain::Nutrition => "Nutrition",
            Domain::Chat => "Coach Chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const LABELS: &'static [&'static str] = &["Male", "Female", "Other"];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// One generation request's worth of validated user input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    Training(TrainingProfile),
    Nutrition(NutritionProfile),
    Chat(ChatPrompt),
}

impl Profile {
    pub fn kind(&self) -> Domain {
        match self {
            Profile::Training(_) => Domain::Training,
            Profile::Nutrition(_) => Domain::Nutrition,
            Profile::Chat(_) => Domain::Chat,
        }
    }
}

/// A single raw form value. Which variant is acceptable depends on the
/// field's [`FieldKind`]: integers for ranges, text for single choices and
/// free text, lists for multiple choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSubmission(BTreeMap<String, FieldValue>);

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    #[cfg(test)]
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlays `other` on top of `self`, field by field.
    pub fn merge(&mut self, other: &FormSubmission) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub(crate) fn int(&self, name: &str) -> i64 {
        match self.0.get(name) {
            Some(FieldValue::Int(n)) => *n,
            _ => 0,
        }
    }

    pub(crate) fn text(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(FieldValue::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub(crate) fn list(&self, name: &str) -> Vec<String> {
        match self.0.get(name) {
            Some(FieldValue::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    IntRange { min: i64, max: i64, default: i64 },
    /// `default` indexes into `options`.
    SingleChoice { options: &'static [&'static str], default: usize },
    MultiChoice { options: &'static [&'static str] },
    FreeText { placeholder: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Takes its default from another (earlier) field's resolved value.
    pub default_from: Option<&'static str>,
}

type Options = &'static [&'static str];

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Self {
        Self { name, label, kind, required, default_from: None }
    }

    pub const fn int(
        name: &'static str,
        label: &'static str,
        min: i64,
        max: i64,
        default: i64,
    ) -> Self {
        Self::new(name, label, FieldKind::IntRange { min, max, default }, true)
    }

    pub const fn choice(
        name: &'static str,
        label: &'static str,
        options: Options,
        default: usize,
    ) -> Self {
        Self::new(name, label, FieldKind::SingleChoice { options, default }, true)
    }

    pub const fn multi(name: &'static str, label: &'static str, options: Options) -> Self {
        Self::new(name, label, FieldKind::MultiChoice { options }, false)
    }

    pub const fn text(name: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self::new(name, label, FieldKind::FreeText { placeholder }, false)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn defaults_to(mut self, field: &'static str) -> Self {
        self.default_from = Some(field);
        self
    }

    /// The value used when the submission omits this field.
    pub fn default_value(&self, resolved: &FormSubmission) -> FieldValue {
        if let Some(src) = self.default_from {
            if let Some(v) = resolved.get(src) {
                return v.clone();
            }
        }
        match self.kind {
            FieldKind::IntRange { default, .. } => FieldValue::Int(default),
            FieldKind::SingleChoice { options, default } => {
                FieldValue::Text(options.get(default).copied().unwrap_or_default().to_string())
            }
            FieldKind::MultiChoice { .. } => FieldValue::List(Vec::new()),
            FieldKind::FreeText { .. } => FieldValue::Text(String::new()),
        }
    }

    fn resolve(
        &self,
        raw: Option<&FieldValue>,
        resolved: &FormSubmission,
    ) -> Result<FieldValue, ValidationError> {
        let (field, label) = (self.name, self.label);
        let value = match raw {
            Some(v) => v.clone(),
            None => self.default_value(resolved),
        };
        match (self.kind, value) {
            (FieldKind::IntRange { min, max, .. }, FieldValue::Int(n)) => {
                if n < min || n > max {
                    return Err(ValidationError::OutOfRange { field, label, min, max, value: n });
                }
                Ok(FieldValue::Int(n))
            }
            (FieldKind::IntRange { .. }, FieldValue::Text(s)) => match s.trim().parse::<i64>() {
                Ok(n) => self.resolve(Some(&FieldValue::Int(n)), resolved),
                Err(_) => {
                    let expected = "a whole number";
                    Err(ValidationError::WrongKind { field, label, expected })
                }
            },
            (FieldKind::SingleChoice { options, .. }, FieldValue::Text(s)) => {
                if s.trim().is_empty() {
                    if self.required {
                        return Err(ValidationError::Missing { field, label });
                    }
                    return Ok(FieldValue::Text(String::new()));
                }
                canonical_option(options, &s)
                    .map(|o| FieldValue::Text(o.to_string()))
                    .ok_or(ValidationError::UnknownOption { field, label, value: s })
            }
            (FieldKind::MultiChoice { options }, FieldValue::List(items)) => {
                let mut picked: Vec<String> = Vec::new();
                for item in items.iter().filter(|i| !i.trim().is_empty()) {
                    let canon = canonical_option(options, item).ok_or_else(|| {
                        ValidationError::UnknownOption { field, label, value: item.clone() }
                    })?;
                    if !picked.iter().any(|p| p == canon) {
                        picked.push(canon.to_string());
                    }
                }
                if self.required && picked.is_empty() {
                    return Err(ValidationError::MissingSelection { field, label });
                }
                Ok(FieldValue::List(picked))
            }
            (FieldKind::FreeText { .. }, FieldValue::Text(s)) => {
                let s = s.trim().to_string();
                if self.required && s.is_empty() {
                    return Err(ValidationError::Missing { field, label });
                }
                Ok(FieldValue::Text(s))
            }
            (kind, _) => {
                let expected = expected_for(kind);
                Err(ValidationError::WrongKind { field, label, expected })
            }
        }
    }
}

fn expected_for(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::IntRange { .. } => "a whole number",
        FieldKind::SingleChoice { .. } => "one option",
        FieldKind::MultiChoice { .. } => "a list of options",
        FieldKind::FreeText { .. } => "text",
    }
}

fn canonical_option(options: &'static [&'static str], value: &str) -> Option<&'static str> {
    let v = value.trim();
    options.iter().copied().find(|o| o.eq_ignore_ascii_case(v))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSpec {
    pub domain: Domain,
    pub title: &'static str,
    pub intro: &'static str,
    pub submit_label: &'static str,
    pub sections: &'static [Section],
}

impl FormSpec {
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().find(|f| f.name == name)
    }

    /// Checks a raw submission against the schema and returns the complete,
    /// canonical submission (every field present, defaults filled in).
    pub fn resolve(&self, raw: &FormSubmission) -> Result<FormSubmission, ValidationError> {
        if let Some((unknown, _)) = raw.iter().find(|(k, _)| self.field(k).is_none()) {
            return Err(ValidationError::Invalid(format!(
                "'{unknown}' is not a field of the {} form",
                self.domain.slug()
            )));
        }
        let mut resolved = FormSubmission::new();
        for field in self.fields() {
            let value = field.resolve(raw.get(field.name), &resolved)?;
            resolved.insert(field.name, value);
        }
        Ok(resolved)
    }

    /// Every field at its default value.
    #[cfg(test)]
    pub fn defaults(&self) -> FormSubmission {
        let mut out = FormSubmission::new();
        for field in self.fields() {
            let v = field.default_value(&out);
            out.insert(field.name, v);
        }
        out
    }
}

/// Validates a raw submission for `domain` and builds its typed profile.
/// Also returns the resolved submission so callers can fold it into a
/// cumulative user profile.
pub fn collect(
    domain: Domain,
    raw: &FormSubmission,
) -> Result<(Profile, FormSubmission), ValidationError> {
    match domain {
        Domain::Training => {
            let resolved = TRAINING_FORM.resolve(raw)?;
            Ok((Profile::Training(TrainingProfile::from_resolved(&resolved)?), resolved))
        }
        Domain::Nutrition => {
            let resolved = NUTRITION_FORM.resolve(raw)?;
            Ok((Profile::Nutrition(NutritionProfile::from_resolved(&resolved)?), resolved))
        }
        Domain::Chat => {
            Err(ValidationError::Invalid("chat has no form; use ChatPrompt::new".into()))
        }
    }
}

pub fn form_for(domain: Domain) -> Option<&'static FormSpec> {
    match domain {
        Domain::Training => Some(&TRAINING_FORM),
        Domain::Nutrition => Some(&NUTRITION_FORM),
        Domain::Chat => None,
    }
}

pub(crate) fn gender_of(resolved: &FormSubmission) -> Result<Gender, ValidationError> {
    let label = resolved.text("gender");
    Gender::from_label(&label).ok_or(ValidationError::UnknownOption {
        field: "gender",
        label: "Gender",
        value: label,
    })
}

pub(crate) fn activity_of(
    resolved: &FormSubmission,
) -> Result<crate::calculator::ActivityLevel, ValidationError> {
    let label = resolved.text("activity_level");
    crate::calculator::ActivityLevel::from_label(&label).ok_or(ValidationError::UnknownOption {
        field: "activity_level",
        label: "Activity Level",
        value: label,
    })
}

pub(crate) fn as_u32(n: i64) -> u32 {
    u32::try_from(n).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.into())
    }

    fn list(items: &[&str]) -> FieldValue {
        FieldValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn defaults_fill_every_field() {
        let d = TRAINING_FORM.defaults();
        assert_eq!(d.len(), TRAINING_FORM.fields().count());
        assert_eq!(d.get("age"), Some(&FieldValue::Int(25)));
        assert_eq!(d.get("gender"), Some(&text("Male")));
        assert_eq!(d.get("equipment"), Some(&FieldValue::List(vec![])));
    }

    #[test]
    fn resolve_canonicalizes_choice_spelling_and_dedupes() {
        let raw = FormSubmission::new()
            .with("gender", text("female"))
            .with("equipment", list(&["dumbbells", "Dumbbells", "pull-up bar"]));
        let resolved = TRAINING_FORM.resolve(&raw).unwrap();
        assert_eq!(resolved.get("gender"), Some(&text("Female")));
        assert_eq!(resolved.get("equipment"), Some(&list(&["Dumbbells", "Pull-up Bar"])));
    }

    #[test]
    fn out_of_range_integers_are_rejected() {
        let raw = FormSubmission::new().with("age", FieldValue::Int(12));
        let err = TRAINING_FORM.resolve(&raw).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "age", min: 16, max: 80, value: 12, .. }
        ));
    }

    #[test]
    fn numeric_text_is_accepted_for_ranges() {
        let raw = FormSubmission::new().with("workout_days", text(" 5 "));
        let resolved = TRAINING_FORM.resolve(&raw).unwrap();
        assert_eq!(resolved.get("workout_days"), Some(&FieldValue::Int(5)));
    }

    #[test]
    fn unknown_option_and_unknown_field_are_rejected() {
        let bad_option = FormSubmission::new().with("workout_location", text("Moon"));
        assert!(matches!(
            TRAINING_FORM.resolve(&bad_option),
            Err(ValidationError::UnknownOption { field: "workout_location", .. })
        ));

        let bad_field = FormSubmission::new().with("favourite_colour", text("blue"));
        assert!(matches!(TRAINING_FORM.resolve(&bad_field), Err(ValidationError::Invalid(_))));
    }

    #[test]
    fn wrong_value_kind_is_rejected() {
        let raw = FormSubmission::new().with("equipment", text("Dumbbells"));
        assert!(matches!(
            TRAINING_FORM.resolve(&raw),
            Err(ValidationError::WrongKind { field: "equipment", .. })
        ));
    }

    #[test]
    fn target_weight_defaults_to_entered_weight() {
        let raw = FormSubmission::new()
            .with("weight", FieldValue::Int(82))
            .with("kitchen_equipment", list(&["Microwave"]));
        let resolved = NUTRITION_FORM.resolve(&raw).unwrap();
        assert_eq!(resolved.get("target_weight"), Some(&FieldValue::Int(82)));
    }

    #[test]
    fn submission_deserializes_from_toml() {
        let raw: FormSubmission = toml::from_str(
            r#"
            age = 31
            gender = "Female"
            equipment = ["Dumbbells"]
            special_notes = "bad knee"
            "#,
        )
        .unwrap();
        assert_eq!(raw.get("age"), Some(&FieldValue::Int(31)));
        assert_eq!(raw.get("equipment"), Some(&list(&["Dumbbells"])));
        assert_eq!(raw.get("special_notes"), Some(&text("bad knee")));
    }

    #[test]
    fn collect_builds_the_matching_profile() {
        let (profile, resolved) = collect(Domain::Training, &FormSubmission::new()).unwrap();
        assert_eq!(profile.kind(), Domain::Training);
        assert_eq!(resolved.get("workout_days"), Some(&FieldValue::Int(4)));
        assert!(collect(Domain::Chat, &FormSubmission::new()).is_err());
    }
}
