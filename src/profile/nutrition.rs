use serde::Serialize;

use super::training::TIMELINES;
use super::{
    activity_of, as_u32, gender_of, Domain, FieldSpec, FormSpec, FormSubmission, Gender, Section,
};
use crate::calculator::ActivityLevel;
use crate::errors::ValidationError;

pub const PRIMARY_GOALS: &[&str] = &[
    "Weight Loss",
    "Weight Gain",
    "Muscle Building",
    "Weight Maintenance",
    "Improved Health",
    "Better Energy",
    "Athletic Performance",
    "Medical Dietary Needs",
];

pub const DIET_TYPES: &[&str] = &[
    "No Specific Diet",
    "Vegetarian",
    "Vegan",
    "Pescatarian",
    "Keto",
    "Paleo",
    "Mediterranean",
    "Low-Carb",
    "Low-Fat",
    "DASH",
    "Intermittent Fasting",
];

pub const ALLERGIES: &[&str] = &[
    "None",
    "Nuts",
    "Dairy/Lactose",
    "Gluten",
    "Shellfish",
    "Eggs",
    "Soy",
    "Fish",
    "Sesame",
];

pub const DISLIKES: &[&str] = &[
    "Seafood",
    "Spicy Food",
    "Mushrooms",
    "Onions",
    "Garlic",
    "Cilantro",
    "Olives",
    "Tomatoes",
    "Beans/Legumes",
    "Leafy Greens",
];

pub const PREFERENCES: &[&str] = &[
    "Organic Foods",
    "Locally Sourced",
    "Minimal Processing",
    "High Protein",
    "High Fiber",
    "Low Sodium",
    "Low Sugar",
    "Fermented Foods",
];

pub const COOKING_SKILLS: &[&str] = &["Beginner", "Intermediate", "Advanced", "Professional"];

pub const COOKING_TIMES: &[&str] = &[
    "15 minutes or less",
    "15-30 minutes",
    "30-60 minutes",
    "60+ minutes",
    "Meal prep sessions",
];

pub const BUDGETS: &[&str] = &[
    "Under $50",
    "$50-100",
    "$100-150",
    "$150-200",
    "$200+",
    "No specific budget",
];

pub const MEAL_PREP: &[&str] = &[
    "No meal prep",
    "Some meal prep",
    "Extensive meal prep",
    "Batch cooking",
];

pub const KITCHEN_EQUIPMENT: &[&str] = &[
    "Basic stove/oven",
    "Microwave",
    "Blender",
    "Food processor",
    "Slow cooker",
    "Air fryer",
    "Grill",
    "Steamer",
    "Pressure cooker",
    "Well-stocked pantry",
];

pub const SHOPPING_FREQUENCIES: &[&str] =
    &["Daily", "Every 2-3 days", "Weekly", "Bi-weekly", "Monthly"];

pub const NUTRITION_FORM: FormSpec = FormSpec {
    domain: Domain::Nutrition,
    title: "Personalized Nutrition Plan Generator",
    intro: "Let's create a customized meal plan that fits your lifestyle and goals!",
    submit_label: "Generate My Nutrition Plan",
    sections: &[
        Section {
            title: "Personal Information",
            fields: &[
                FieldSpec::int("age", "Age", 16, 80, 25),
                FieldSpec::choice("gender", "Gender", Gender::LABELS, 0),
                FieldSpec::int("height", "Height (cm)", 120, 220, 170),
                FieldSpec::int("weight", "Current Weight (kg)", 40, 200, 70),
                FieldSpec::int("target_weight", "Target Weight (kg)", 40, 200, 70)
                    .defaults_to("weight"),
                FieldSpec::choice("activity_level", "Activity Level", ActivityLevel::LABELS, 0),
                FieldSpec::text(
                    "health_conditions",
                    "Health Conditions (if any)",
                    "e.g., diabetes, high cholesterol, food allergies, etc.",
                ),
            ],
        },
        Section {
            title: "Nutrition Goals",
            fields: &[
                FieldSpec::choice("primary_goal", "Primary Nutrition Goal", PRIMARY_GOALS, 0),
                FieldSpec::choice("timeline", "Goal Timeline", TIMELINES, 0),
            ],
        },
        Section {
            title: "Dietary Preferences & Restrictions",
            fields: &[
                FieldSpec::choice("diet_type", "Diet Type", DIET_TYPES, 0),
                FieldSpec::multi("food_allergies", "Food Allergies/Intolerances", ALLERGIES),
                FieldSpec::multi("dislikes", "Foods You Dislike", DISLIKES),
                FieldSpec::multi("preferences", "Food Preferences", PREFERENCES),
            ],
        },
        Section {
            title: "Lifestyle & Practical Considerations",
            fields: &[
                FieldSpec::int("meals_per_day", "Preferred Meals per Day", 2, 6, 3),
                FieldSpec::choice("cooking_skill", "Cooking Skill Level", COOKING_SKILLS, 0),
                FieldSpec::choice("cooking_time", "Available Cooking Time", COOKING_TIMES, 0),
                FieldSpec::choice("budget", "Weekly Food Budget", BUDGETS, 0),
                FieldSpec::choice("meal_prep", "Meal Prep Preference", MEAL_PREP, 0),
                FieldSpec::text(
                    "eating_schedule",
                    "Eating Schedule Preferences",
                    "e.g., breakfast at 7am, lunch at 12pm, dinner at 7pm",
                ),
            ],
        },
        Section {
            title: "Shopping & Kitchen Setup",
            fields: &[
                FieldSpec::multi("kitchen_equipment", "Kitchen Equipment", KITCHEN_EQUIPMENT)
                    .required(),
                FieldSpec::choice(
                    "shopping_frequency",
                    "Grocery Shopping Frequency",
                    SHOPPING_FREQUENCIES,
                    0,
                ),
            ],
        },
        Section {
            title: "Additional Information",
            fields: &[
                FieldSpec::text(
                    "supplements",
                    "Current Supplements (if any)",
                    "e.g., multivitamin, protein powder, omega-3, etc.",
                ),
                FieldSpec::text(
                    "special_notes",
                    "Special Requests or Notes",
                    "Any specific requirements, cultural preferences, or additional information...",
                ),
            ],
        },
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionProfile {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub target_weight_kg: u32,
    pub activity_level: ActivityLevel,
    pub health_conditions: String,
    pub primary_goal: String,
    pub timeline: String,
    pub diet_type: String,
    pub food_allergies: Vec<String>,
    pub dislikes: Vec<String>,
    pub preferences: Vec<String>,
    pub meals_per_day: u32,
    pub cooking_skill: String,
    pub cooking_time: String,
    pub budget: String,
    pub meal_prep: String,
    pub eating_schedule: String,
    pub kitchen_equipment: Vec<String>,
    pub shopping_frequency: String,
    pub supplements: String,
    pub special_notes: String,
}

impl NutritionProfile {
    #[cfg(test)]
    pub fn from_submission(raw: &FormSubmission) -> Result<Self, ValidationError> {
        Self::from_resolved(&NUTRITION_FORM.resolve(raw)?)
    }

    pub(crate) fn from_resolved(r: &FormSubmission) -> Result<Self, ValidationError> {
        Ok(Self {
            age: as_u32(r.int("age")),
            gender: gender_of(r)?,
            height_cm: as_u32(r.int("height")),
            weight_kg: as_u32(r.int("weight")),
            target_weight_kg: as_u32(r.int("target_weight")),
            activity_level: activity_of(r)?,
            health_conditions: r.text("health_conditions"),
            primary_goal: r.text("primary_goal"),
            timeline: r.text("timeline"),
            diet_type: r.text("diet_type"),
            food_allergies: r.list("food_allergies"),
            dislikes: r.list("dislikes"),
            preferences: r.list("preferences"),
            meals_per_day: as_u32(r.int("meals_per_day")),
            cooking_skill: r.text("cooking_skill"),
            cooking_time: r.text("cooking_time"),
            budget: r.text("budget"),
            meal_prep: r.text("meal_prep"),
            eating_schedule: r.text("eating_schedule"),
            kitchen_equipment: r.list("kitchen_equipment"),
            shopping_frequency: r.text("shopping_frequency"),
            supplements: r.text("supplements"),
            special_notes: r.text("special_notes"),
        })
    }
}
