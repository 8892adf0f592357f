//! Energy expenditure estimates.
//!
//! Basal Metabolic Rate uses the Mifflin-St Jeor equation:
//! Mifflin, M.D., et al. (1990). A new predictive equation for resting energy
//! expenditure in healthy individuals. *Am J Clin Nutr*, 51(2), 241-247.
//!
//! Values are kept as `f64` throughout; rounding happens only in
//! [`EnergyTargets::display_kcal`].

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::profile::{Gender, NutritionProfile};

/// Daily deficit/surplus used for the weight-change targets.
pub const WEIGHT_CHANGE_KCAL: f64 = 500.0;

/// Biological sex category for the BMR constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    fn constant(self) -> f64 {
        match self {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        }
    }
}

impl TryFrom<Gender> for Sex {
    type Error = ValidationError;

    fn try_from(g: Gender) -> Result<Self, Self::Error> {
        match g {
            Gender::Male => Ok(Sex::Male),
            Gender::Female => Ok(Sex::Female),
            Gender::Other => Err(ValidationError::Invalid(
                "the Mifflin-St Jeor equation needs a male or female sex category".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise or a physical job
    ExtremelyActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];

    pub const LABELS: &'static [&'static str] = &[
        "Sedentary",
        "Lightly Active",
        "Moderately Active",
        "Very Active",
        "Extremely Active",
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtremelyActive => 1.9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => Self::LABELS[0],
            ActivityLevel::LightlyActive => Self::LABELS[1],
            ActivityLevel::ModeratelyActive => Self::LABELS[2],
            ActivityLevel::VeryActive => Self::LABELS[3],
            ActivityLevel::ExtremelyActive => Self::LABELS[4],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Basal Metabolic Rate in kcal/day.
///
/// `10 x weight_kg + 6.25 x height_cm - 5 x age + s`, where `s` is +5 for
/// males and -161 for females.
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: f64, sex: Sex) -> f64 {
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years + sex.constant()
}

/// Total Daily Energy Expenditure: BMR scaled by the activity multiplier.
pub fn tdee(bmr: f64, activity: ActivityLevel) -> f64 {
    bmr * activity.multiplier()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    pub sex: Sex,
    pub activity: ActivityLevel,
}

impl TryFrom<&NutritionProfile> for BodyMetrics {
    type Error = ValidationError;

    fn try_from(p: &NutritionProfile) -> Result<Self, Self::Error> {
        Ok(Self {
            weight_kg: f64::from(p.weight_kg),
            height_cm: f64::from(p.height_cm),
            age_years: f64::from(p.age),
            sex: Sex::try_from(p.gender)?,
            activity: p.activity_level,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyTargets {
    pub bmr: f64,
    pub tdee: f64,
    pub weight_loss: f64,
    pub weight_gain: f64,
}

impl EnergyTargets {
    /// Whole kilocalories (half away from zero), for display only.
    pub fn display_kcal(value: f64) -> String {
        format!("{:.0}", value.round())
    }
}

/// Validates the inputs and computes BMR, TDEE and the +/-500 kcal targets.
///
/// # Errors
///
/// Returns a validation error if weight, height or age is not positive and
/// finite.
pub fn energy_targets(m: &BodyMetrics) -> Result<EnergyTargets, ValidationError> {
    for (what, v) in [("Weight", m.weight_kg), ("Height", m.height_cm), ("Age", m.age_years)] {
        if !v.is_finite() || v <= 0.0 {
            let msg = format!("{what} must be a positive number (got {v})");
            return Err(ValidationError::Invalid(msg));
        }
    }
    let bmr = mifflin_st_jeor(m.weight_kg, m.height_cm, m.age_years, m.sex);
    let tdee = tdee(bmr, m.activity);
    Ok(EnergyTargets {
        bmr,
        tdee,
        weight_loss: tdee - WEIGHT_CHANGE_KCAL,
        weight_gain: tdee + WEIGHT_CHANGE_KCAL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmr_follows_mifflin_st_jeor() {
        // 700 + 1062.5 - 125 + 5
        let male = mifflin_st_jeor(70.0, 170.0, 25.0, Sex::Male);
        assert!((male - 1642.5).abs() < 1e-9);
        // 700 + 1062.5 - 125 - 161
        let female = mifflin_st_jeor(70.0, 170.0, 25.0, Sex::Female);
        assert!((female - 1476.5).abs() < 1e-9);
        assert!((male - female - 166.0).abs() < 1e-9);
    }

    #[test]
    fn tdee_applies_the_activity_multiplier() {
        let bmr = mifflin_st_jeor(70.0, 170.0, 25.0, Sex::Male);
        assert!((tdee(bmr, ActivityLevel::Sedentary) - bmr * 1.2).abs() < 1e-6);
        assert!((tdee(bmr, ActivityLevel::LightlyActive) - bmr * 1.375).abs() < 1e-6);
        assert!((tdee(bmr, ActivityLevel::ModeratelyActive) - bmr * 1.55).abs() < 1e-6);
        assert!((tdee(bmr, ActivityLevel::VeryActive) - bmr * 1.725).abs() < 1e-6);
        assert!((tdee(bmr, ActivityLevel::ExtremelyActive) - bmr * 1.9).abs() < 1e-6);
    }

    #[test]
    fn targets_are_tdee_plus_minus_500() {
        let m = BodyMetrics {
            weight_kg: 80.0,
            height_cm: 180.0,
            age_years: 30.0,
            sex: Sex::Male,
            activity: ActivityLevel::ModeratelyActive,
        };
        let t = energy_targets(&m).unwrap();
        // 800 + 1125 - 150 + 5 = 1780; x 1.55 = 2759
        assert!((t.bmr - 1780.0).abs() < 1e-9);
        assert!((t.tdee - 2759.0).abs() < 1e-6);
        assert!((t.weight_loss - 2259.0).abs() < 1e-6);
        assert!((t.weight_gain - 3259.0).abs() < 1e-6);
    }

    #[test]
    fn display_rounds_to_whole_kcal() {
        assert_eq!(EnergyTargets::display_kcal(1642.5), "1643");
        assert_eq!(EnergyTargets::display_kcal(1476.4), "1476");
        assert_eq!(EnergyTargets::display_kcal(1970.99), "1971");
    }

    #[test]
    fn non_positive_inputs_are_rejected() {
        let m = BodyMetrics {
            weight_kg: 0.0,
            height_cm: 170.0,
            age_years: 25.0,
            sex: Sex::Female,
            activity: ActivityLevel::Sedentary,
        };
        assert!(energy_targets(&m).is_err());
    }

    #[test]
    fn other_gender_has_no_bmr_constant() {
        assert!(Sex::try_from(Gender::Other).is_err());
        assert_eq!(Sex::try_from(Gender::Female).unwrap(), Sex::Female);
    }

    #[test]
    fn activity_labels_round_trip() {
        for a in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::from_label(a.label()), Some(a));
        }
        assert_eq!(ActivityLevel::from_label("very active"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::from_label("couch"), None);
    }
}
