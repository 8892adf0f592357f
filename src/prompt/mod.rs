use std::fmt::Display;

use crate::profile::{ChatPrompt, ChatRole, NutritionProfile, Profile, TrainingProfile};

/// Literal used for empty lists and blank free text.
pub const NONE: &str = "None";
/// Literal used for blank schedule-type free text.
pub const FLEXIBLE: &str = "Flexible";

const TRAINING_DELIVERABLES: &[&str] = &[
    "Weekly training schedule with specific days",
    "Detailed workout routines for each training day",
    "Warm-up and cool-down recommendations",
    "Exercise descriptions and proper form tips",
    "Progressive overload suggestions",
    "Recovery and rest recommendations",
    "Progress tracking methods",
];

const NUTRITION_DELIVERABLES: &[&str] = &[
    "Daily calorie target and macronutrient breakdown",
    "Sample meal plan for one day",
    "Weekly meal prep suggestions",
    "Hydration recommendations",
    "Specific tips based on their goals and preferences",
    "Progress tracking suggestions",
];

const CHAT_DELIVERABLES: &[&str] = &[
    "A direct answer to the question",
    "Advice tailored to the known profile details above, where relevant",
    "A note on anything that warrants consulting a medical professional",
];

fn training_format() -> &'static str {
    "Format the response in clear sections with headers and detailed exercise instructions."
}

fn nutrition_format() -> &'static str {
    "Format the response in clear sections with headers and bullet points for easy reading."
}

fn chat_persona() -> &'static str {
r#"You are an encouraging, evidence-based personal fitness and nutrition coach.
Answer the user's question using what you know about them. Stay practical and
specific; do not invent details about the user that are not listed below."#
}

fn chat_format() -> &'static str {
    "Keep the response concise: short paragraphs or bullet points, \
     no more than a few hundred words."
}

/// Renders the prompt for a profile. The template is chosen by the
/// profile's variant; output is a pure function of the profile.
pub fn build_prompt(profile: &Profile) -> String {
    match profile {
        Profile::Training(p) => training_prompt(p),
        Profile::Nutrition(p) => nutrition_prompt(p),
        Profile::Chat(p) => chat_prompt(p),
    }
}

pub fn training_prompt(p: &TrainingProfile) -> String {
    let mut w = PromptWriter::new(
        "Create a comprehensive, personalized training plan based on the following information:",
    );
    w.section("PERSONAL DETAILS")
        .measure("Age", p.age, "years")
        .scalar("Gender", p.gender.label())
        .measure("Height", p.height_cm, "cm")
        .measure("Weight", p.weight_kg, "kg")
        .scalar("Current Fitness Level", &p.fitness_level)
        .scalar("Activity Level", p.activity_level.label())
        .text("Medical Conditions/Injuries", &p.medical_conditions, NONE);
    w.section("FITNESS GOALS")
        .scalar("Primary Goal", &p.primary_goal)
        .list("Secondary Goals", &p.secondary_goals)
        .scalar("Target Timeline", &p.timeline);
    w.section("WORKOUT PREFERENCES")
        .scalar("Workout Days per Week", p.workout_days)
        .measure("Time per Session", &p.time_per_session, "minutes")
        .scalar("Workout Location", &p.workout_location)
        .list("Available Equipment", &p.equipment)
        .list("Preferred Workout Types", &p.workout_types)
        .list("Exercise Experience", &p.exercise_experience);
    w.section("SCHEDULE & PREFERENCES")
        .scalar("Preferred Workout Time", &p.workout_time)
        .text("Rest Day Preferences", &p.rest_days, FLEXIBLE);
    w.note("SPECIAL NOTES", &p.special_notes);
    w.deliverables(TRAINING_DELIVERABLES, training_format());
    w.finish()
}

pub fn nutrition_prompt(p: &NutritionProfile) -> String {
    let mut w = PromptWriter::new(
        "Create a comprehensive, personalized nutrition plan based on the following information:",
    );
    w.section("PERSONAL DETAILS")
        .measure("Age", p.age, "years")
        .scalar("Gender", p.gender.label())
        .measure("Height", p.height_cm, "cm")
        .measure("Current Weight", p.weight_kg, "kg")
        .measure("Target Weight", p.target_weight_kg, "kg")
        .scalar("Activity Level", p.activity_level.label())
        .text("Health Conditions", &p.health_conditions, NONE);
    w.section("NUTRITION GOALS")
        .scalar("Primary Goal", &p.primary_goal)
        .scalar("Timeline", &p.timeline);
    w.section("DIETARY PREFERENCES")
        .scalar("Diet Type", &p.diet_type)
        .list("Food Allergies/Intolerances", &p.food_allergies)
        .list("Foods Disliked", &p.dislikes)
        .list("Food Preferences", &p.preferences);
    w.section("LIFESTYLE FACTORS")
        .scalar("Meals per Day", p.meals_per_day)
        .scalar("Cooking Skill", &p.cooking_skill)
        .scalar("Available Cooking Time", &p.cooking_time)
        .scalar("Weekly Budget", &p.budget)
        .scalar("Meal Prep Preference", &p.meal_prep)
        .text("Eating Schedule", &p.eating_schedule, FLEXIBLE)
        .list("Kitchen Equipment", &p.kitchen_equipment)
        .scalar("Shopping Frequency", &p.shopping_frequency)
        .text("Current Supplements", &p.supplements, NONE);
    w.note("SPECIAL NOTES", &p.special_notes);
    w.deliverables(NUTRITION_DELIVERABLES, nutrition_format());
    w.finish()
}

pub fn chat_prompt(p: &ChatPrompt) -> String {
    let mut w = PromptWriter::new(chat_persona());
    w.section("KNOWN TRAINING PROFILE");
    match &p.training {
        Some(t) => {
            w.measure("Age", t.age, "years")
                .scalar("Gender", t.gender.label())
                .measure("Height", t.height_cm, "cm")
                .measure("Weight", t.weight_kg, "kg")
                .scalar("Fitness Level", &t.fitness_level)
                .scalar("Primary Goal", &t.primary_goal)
                .scalar("Workout Days per Week", t.workout_days)
                .list("Available Equipment", &t.equipment)
                .text("Medical Conditions/Injuries", &t.medical_conditions, NONE);
        }
        None => w.line("No training profile submitted yet."),
    }
    w.section("KNOWN NUTRITION PROFILE");
    match &p.nutrition {
        Some(n) => {
            w.measure("Age", n.age, "years")
                .scalar("Gender", n.gender.label())
                .measure("Current Weight", n.weight_kg, "kg")
                .measure("Target Weight", n.target_weight_kg, "kg")
                .scalar("Primary Goal", &n.primary_goal)
                .scalar("Diet Type", &n.diet_type)
                .list("Food Allergies/Intolerances", &n.food_allergies)
                .text("Health Conditions", &n.health_conditions, NONE);
        }
        None => w.line("No nutrition profile submitted yet."),
    }
    if !p.recent_turns.is_empty() {
        w.section("RECENT CONVERSATION");
        for turn in &p.recent_turns {
            let who = match turn.role {
                ChatRole::User => "User",
                ChatRole::Coach => "Coach",
            };
            w.line(&format!("{who}: {}", single_line(&turn.text)));
        }
    }
    w.section("QUESTION");
    w.line(&p.message);
    w.deliverables(CHAT_DELIVERABLES, chat_format());
    w.finish()
}

/// Line-oriented prompt assembly. Every field renders as one `- label: value`
/// line so the service sees a stable layout.
struct PromptWriter {
    out: String,
}

impl PromptWriter {
    fn new(opening: &str) -> Self {
        let mut out = String::with_capacity(2048);
        out.push_str(opening.trim());
        out.push('\n');
        Self { out }
    }

    fn section(&mut self, title: &str) -> &mut Self {
        self.out.push('\n');
        self.out.push_str(title);
        self.out.push_str(":\n");
        self
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn scalar(&mut self, label: &str, value: impl Display) -> &mut Self {
        self.out.push_str(&format!("- {label}: {value}\n"));
        self
    }

    fn measure(&mut self, label: &str, value: impl Display, unit: &str) -> &mut Self {
        self.out.push_str(&format!("- {label}: {value} {unit}\n"));
        self
    }

    fn list(&mut self, label: &str, values: &[String]) -> &mut Self {
        self.scalar(label, join_or(values, NONE))
    }

    fn text(&mut self, label: &str, value: &str, fallback: &str) -> &mut Self {
        self.scalar(label, text_or(value, fallback))
    }

    fn note(&mut self, label: &str, value: &str) {
        self.out.push_str(&format!("\n{label}: {}\n", text_or(value, NONE)));
    }

    fn deliverables(&mut self, items: &[&str], format_line: &str) {
        self.out.push_str("\nPlease provide:\n");
        for (i, item) in items.iter().enumerate() {
            self.out.push_str(&format!("{}. {item}\n", i + 1));
        }
        self.out.push('\n');
        self.out.push_str(format_line);
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Comma-joins the non-blank values, or returns `fallback` if none remain.
pub fn join_or(values: &[String], fallback: &str) -> String {
    let kept: Vec<&str> = values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect();
    if kept.is_empty() {
        fallback.to_string()
    } else {
        kept.join(", ")
    }
}

/// Free text flattened onto one line, or `fallback` when blank.
pub fn text_or(value: &str, fallback: &str) -> String {
    let flat = single_line(value);
    if flat.is_empty() {
        fallback.to_string()
    } else {
        flat
    }
}

fn single_line(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
