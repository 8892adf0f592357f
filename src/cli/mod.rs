use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::calculator::{ActivityLevel, Sex};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google")]
    Gemini,
    #[value(alias = "open-ai", alias = "openai")]
    OpenAI,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn key_env(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s.trim(), true).ok()
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanKind {
    Training,
    Nutrition,
}

#[derive(Parser, Debug)]
#[command(
    name = "fitness-coach",
    version,
    about = "AI fitness coach: personalized training and nutrition plans"
)]
pub struct Args {
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    /// API key for the generation service (prefer the environment variable)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<String>,

    /// Directory for downloaded plans
    #[arg(long)]
    pub export_dir: Option<String>,

    /// Save every prompt/completion pair as JSON artifacts
    #[arg(long, default_value_t = false)]
    pub save_transcripts: bool,

    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive coach (the default)
    Interactive,
    /// Generate one plan from a TOML profile file and print it
    Plan {
        #[arg(value_enum)]
        kind: PlanKind,
        /// TOML file of form fields, e.g. `age = 30`, `equipment = ["Dumbbells"]`
        #[arg(long)]
        profile: String,
        /// Also write the plan to the export directory
        #[arg(long, default_value_t = false)]
        export: bool,
    },
    /// Print BMR, TDEE and calorie targets
    Bmr {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        age: f64,
        #[arg(long, value_enum)]
        sex: Sex,
        #[arg(long, value_enum, default_value_t = ActivityLevel::Sedentary)]
        activity: ActivityLevel,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_aliases() {
        assert_eq!(ProviderKind::parse("google"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAI));
        assert_eq!(ProviderKind::parse("ollama"), None);
    }

    #[test]
    fn bmr_subcommand_parses() {
        let args = Args::parse_from([
            "fitness-coach", "bmr", "--weight", "70", "--height", "170", "--age", "25",
            "--sex", "female",
            "--activity", "very-active",
        ]);
        match args.command {
            Some(Command::Bmr { sex, activity, weight, .. }) => {
                assert_eq!(sex, Sex::Female);
                assert_eq!(activity, ActivityLevel::VeryActive);
                assert_eq!(weight, 70.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let args = Args::parse_from(["fitness-coach"]);
        assert!(args.command.is_none());
        assert!(!args.verbose);
    }
}
