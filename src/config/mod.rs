use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Args, ProviderKind};
use crate::errors::CoachError;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fitness-coach.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    /// Overrides the provider's public endpoint (proxies, local gateways).
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    /// Environment variable holding the key; defaults per provider.
    pub api_key_env: Option<String>,
    pub export_dir: PathBuf,
    pub transcripts_dir: Option<PathBuf>,
    pub history_display: usize,
    pub water_goal_ml: i64,
    pub water_step_ml: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: ProviderKind::Gemini.default_model().into(),
            api_base: None,
            api_key: None,
            api_key_env: None,
            export_dir: PathBuf::from("."),
            transcripts_dir: None,
            history_display: 3,
            water_goal_ml: 2500,
            water_step_ml: 250,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then environment, then CLI flags.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => Self::from_file(Path::new(path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.apply_args(args);
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs_err::read_to_string(path)?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// A missing or blank `model` means the provider's default model.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        let has_model = table
            .get("model")
            .and_then(toml::Value::as_str)
            .is_some_and(|m| !m.trim().is_empty());
        let mut cfg: Config = toml::Value::Table(table).try_into()?;
        if !has_model {
            cfg.model = cfg.provider.default_model().into();
        }
        Ok(cfg)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(p) = var("COACH_PROVIDER").and_then(|p| ProviderKind::parse(&p)) {
            if p != self.provider {
                self.model = p.default_model().into();
            }
            self.provider = p;
        }
        if let Some(m) = var("COACH_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = m;
        }
        if let Some(key) = var(self.key_env()).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            if p != self.provider && args.model.is_none() {
                self.model = p.default_model().into();
            }
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = m.clone();
        }
        if let Some(k) = &args.api_key {
            self.api_key = Some(k.clone());
        }
        if let Some(dir) = &args.export_dir {
            self.export_dir = PathBuf::from(dir);
        }
        if args.save_transcripts && self.transcripts_dir.is_none() {
            self.transcripts_dir = Some(PathBuf::from(".coach").join("transcripts"));
        }
    }

    pub fn key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.provider.key_env())
    }

    /// The credential to use, or a configuration error describing how to
    /// supply one.
    pub fn api_key(&self) -> Result<String, CoachError> {
        let key = self.api_key.as_deref().map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(CoachError::Configuration(format!(
                "API key not found. Set {} or add api_key to {}.",
                self.key_env(),
                DEFAULT_CONFIG_FILE
            )));
        }
        if key.chars().any(char::is_whitespace) {
            return Err(CoachError::Configuration("API key must not contain whitespace".into()));
        }
        Ok(key.to_string())
    }
}
