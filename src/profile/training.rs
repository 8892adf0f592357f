use serde::Serialize;

use super::{
    activity_of, as_u32, gender_of, Domain, FieldSpec, FormSpec, FormSubmission, Gender, Section,
};
use crate::calculator::ActivityLevel;
use crate::errors::ValidationError;

pub const FITNESS_LEVELS: &[&str] = &["Beginner", "Intermediate", "Advanced", "Expert"];

pub const PRIMARY_GOALS: &[&str] = &[
    "Weight Loss",
    "Muscle Building",
    "Strength Training",
    "Endurance/Cardio",
    "General Fitness",
    "Athletic Performance",
    "Rehabilitation",
    "Flexibility/Mobility",
];

pub const SECONDARY_GOALS: &[&str] = &[
    "Improve Posture",
    "Increase Energy",
    "Better Sleep",
    "Stress Relief",
    "Core Strength",
    "Balance & Coordination",
    "Functional Movement",
];

pub const TIMELINES: &[&str] = &[
    "1-2 months",
    "3-6 months",
    "6-12 months",
    "Long-term lifestyle change",
];

pub const SESSION_LENGTHS: &[&str] = &["15-30", "30-45", "45-60", "60-90", "90+"];

pub const LOCATIONS: &[&str] = &["Home", "Gym", "Outdoor", "Mixed (Home + Gym)"];

pub const EQUIPMENT: &[&str] = &[
    "No Equipment (Bodyweight)",
    "Dumbbells",
    "Resistance Bands",
    "Pull-up Bar",
    "Kettlebells",
    "Barbell",
    "Cable Machine",
    "Cardio Equipment",
    "Full Gym Access",
];

pub const WORKOUT_TYPES: &[&str] = &[
    "Strength Training",
    "Cardio/HIIT",
    "Yoga/Pilates",
    "Functional Training",
    "Bodyweight Exercises",
    "Olympic Lifting",
    "Circuit Training",
    "Sports-Specific",
];

pub const WORKOUT_TIMES: &[&str] = &[
    "Early Morning",
    "Morning",
    "Afternoon",
    "Evening",
    "Night",
    "Flexible",
];

pub const EXPERIENCE: &[&str] = &[
    "Weight Training",
    "Running/Cardio",
    "Sports",
    "Yoga/Pilates",
    "Martial Arts",
    "Dancing",
    "Swimming",
    "Cycling",
];

pub const TRAINING_FORM: FormSpec = FormSpec {
    domain: Domain::Training,
    title: "Personalized Training Plan Generator",
    intro: "Tell us about yourself and your fitness goals to get a customized workout plan!",
    submit_label: "Generate My Training Plan",
    sections: &[
        Section {
            title: "Personal Information",
            fields: &[
                FieldSpec::int("age", "Age", 16, 80, 25),
                FieldSpec::choice("gender", "Gender", Gender::LABELS, 0),
                FieldSpec::int("height", "Height (cm)", 120, 220, 170),
                FieldSpec::int("weight", "Weight (kg)", 40, 200, 70),
                FieldSpec::choice("fitness_level", "Current Fitness Level", FITNESS_LEVELS, 0),
                FieldSpec::choice(
                    "activity_level",
                    "Current Activity Level",
                    ActivityLevel::LABELS,
                    0,
                ),
                FieldSpec::text(
                    "medical_conditions",
                    "Medical Conditions or Injuries (if any)",
                    "e.g., lower back pain, knee issues, etc.",
                ),
            ],
        },
        Section {
            title: "Fitness Goals",
            fields: &[
                FieldSpec::choice("primary_goal", "Primary Fitness Goal", PRIMARY_GOALS, 0),
                FieldSpec::multi("secondary_goals", "Secondary Goals (optional)", SECONDARY_GOALS),
                FieldSpec::choice("timeline", "Goal Timeline", TIMELINES, 0),
            ],
        },
        Section {
            title: "Workout Preferences",
            fields: &[
                FieldSpec::int("workout_days", "Workout Days per Week", 2, 7, 4),
                FieldSpec::choice(
                    "time_per_session",
                    "Time per Session (minutes)",
                    SESSION_LENGTHS,
                    0,
                ),
                FieldSpec::choice("workout_location", "Workout Location", LOCATIONS, 0),
                FieldSpec::multi("equipment", "Available Equipment", EQUIPMENT),
                FieldSpec::multi("workout_types", "Preferred Workout Types", WORKOUT_TYPES),
            ],
        },
        Section {
            title: "Schedule Preferences",
            fields: &[
                FieldSpec::choice("workout_time", "Preferred Workout Time", WORKOUT_TIMES, 0),
                FieldSpec::text(
                    "rest_days",
                    "Preferred Rest Days",
                    "e.g., Wednesday, Sunday or Flexible",
                ),
                FieldSpec::multi("exercise_experience", "Previous Exercise Experience", EXPERIENCE),
            ],
        },
        Section {
            title: "Additional Information",
            fields: &[FieldSpec::text(
                "special_notes",
                "Special Requests or Notes",
                "Any specific requirements, preferences, or additional information...",
            )],
        },
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingProfile {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub fitness_level: String,
    pub activity_level: ActivityLevel,
    pub medical_conditions: String,
    pub primary_goal: String,
    pub secondary_goals: Vec<String>,
    pub timeline: String,
    pub workout_days: u32,
    pub time_per_session: String,
    pub workout_location: String,
    pub equipment: Vec<String>,
    pub workout_types: Vec<String>,
    pub workout_time: String,
    pub rest_days: String,
    pub exercise_experience: Vec<String>,
    pub special_notes: String,
}

impl TrainingProfile {
    #[cfg(test)]
    pub fn from_submission(raw: &FormSubmission) -> Result<Self, ValidationError> {
        Self::from_resolved(&TRAINING_FORM.resolve(raw)?)
    }

    pub(crate) fn from_resolved(r: &FormSubmission) -> Result<Self, ValidationError> {
        Ok(Self {
            age: as_u32(r.int("age")),
            gender: gender_of(r)?,
            height_cm: as_u32(r.int("height")),
            weight_kg: as_u32(r.int("weight")),
            fitness_level: r.text("fitness_level"),
            activity_level: activity_of(r)?,
            medical_conditions: r.text("medical_conditions"),
            primary_goal: r.text("primary_goal"),
            secondary_goals: r.list("secondary_goals"),
            timeline: r.text("timeline"),
            workout_days: as_u32(r.int("workout_days")),
            time_per_session: r.text("time_per_session"),
            workout_location: r.text("workout_location"),
            equipment: r.list("equipment"),
            workout_types: r.list("workout_types"),
            workout_time: r.text("workout_time"),
            rest_days: r.text("rest_days"),
            exercise_experience: r.list("exercise_experience"),
            special_notes: r.text("special_notes"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FieldValue;

    #[test]
    fn default_submission_builds_a_profile() {
        let p = TrainingProfile::from_submission(&FormSubmission::new()).unwrap();
        assert_eq!(p.age, 25);
        assert_eq!(p.gender, Gender::Male);
        assert_eq!(p.activity_level, ActivityLevel::Sedentary);
        assert_eq!(p.workout_days, 4);
        assert!(p.equipment.is_empty());
        assert_eq!(p.special_notes, "");
    }

    #[test]
    fn training_equipment_is_optional() {
        let raw = FormSubmission::new().with("equipment", FieldValue::List(vec![]));
        assert!(TrainingProfile::from_submission(&raw).is_ok());
    }

    #[test]
    fn workout_days_outside_slider_range_fail() {
        let raw = FormSubmission::new().with("workout_days", FieldValue::Int(8));
        let err = TrainingProfile::from_submission(&raw).unwrap_err();
        assert_eq!(err.field(), Some("workout_days"));
    }
}
