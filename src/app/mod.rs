//! The interactive session: a menu of views, each with its own actions.
//! Every `CoachError` is caught here and shown as a message; only terminal
//! I/O failures end the loop.

use chrono::{Local, NaiveDate};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

use crate::calculator::{energy_targets, ActivityLevel, BodyMetrics, Sex};
use crate::coach::Coach;
use crate::config::Config;
use crate::errors::CoachError;
use crate::export::write_plan;
use crate::profile::{form_for, Domain, FieldValue};
use crate::provider::GenerationClient;
use crate::session::{GenerationResult, SessionStore, SleepEntry, WATER_COUNTER};
use crate::ux::Terminal;
use crate::view::{render, render_result, status_banner, targets_screen, Snapshot, Tone, View};

const MAIN_MENU: [(&str, Option<View>); 8] = [
    ("Training Plan", Some(View::Training)),
    ("Nutrition Plan", Some(View::Nutrition)),
    ("Coach Chat", Some(View::Chat)),
    ("Calorie Calculator", Some(View::Calculator)),
    ("Water & Sleep Trackers", Some(View::Trackers)),
    ("Plan History", Some(View::History)),
    ("Enter API key", None),
    ("Quit", None),
];

const PLAN_ACTIONS: [&str; 4] = [
    "Fill out the form and generate",
    "Regenerate from my last answers",
    "Download latest plan",
    "Back",
];
const TRACKER_ACTIONS: [&str; 4] = ["Add a glass of water", "Reset water", "Log sleep", "Back"];
const SLEEP_QUALITY: [&str; 5] = ["1 - Poor", "2 - Fair", "3 - Okay", "4 - Good", "5 - Great"];

pub struct App<R, W> {
    term: Terminal<R, W>,
    coach: Coach,
    session: SessionStore,
    cfg: Config,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(term: Terminal<R, W>, coach: Coach, cfg: Config) -> Self {
        Self { term, coach, session: SessionStore::new(), cfg }
    }

    /// Runs until the user quits or input closes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!(session = %self.session.id(), "interactive session started");
        match self.main_loop().await {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
            other => other?,
        }
        info!(session = %self.session.id(), plans = self.session.total_history(), "session ended");
        Ok(())
    }

    async fn main_loop(&mut self) -> io::Result<()> {
        self.session.get_or_init("page", json!(View::Home.label()));
        loop {
            self.show(View::Home)?;
            let labels: Vec<&str> = MAIN_MENU.iter().map(|(l, _)| *l).collect();
            let i = self.term.menu("Menu", &labels)?;
            match MAIN_MENU[i] {
                (_, Some(view)) => self.open(view).await?,
                ("Enter API key", None) => self.enter_api_key()?,
                _ => return Ok(()),
            }
        }
    }

    fn show(&mut self, view: View) -> io::Result<()> {
        self.session.set("page", json!(view.label()));
        let status = self.coach.status();
        let snap = Snapshot {
            session: &self.session,
            status: &status,
            water_goal_ml: self.cfg.water_goal_ml,
            history_display: self.cfg.history_display,
        };
        let screen = render(view, &snap);
        self.term.paint(&screen)
    }

    async fn open(&mut self, view: View) -> io::Result<()> {
        debug!(view = view.label(), "open view");
        match view {
            View::Training => self.plan_view(Domain::Training).await,
            View::Nutrition => self.plan_view(Domain::Nutrition).await,
            View::Chat => self.chat_view().await,
            View::Calculator => self.calculator_view(),
            View::Trackers => self.trackers_view(),
            View::Home | View::History => self.show(view),
        }
    }

    async fn plan_view(&mut self, domain: Domain) -> io::Result<()> {
        let view = if domain == Domain::Training { View::Training } else { View::Nutrition };
        loop {
            self.show(view)?;
            match self.term.menu("Actions", &PLAN_ACTIONS)? {
                0 => self.generate(domain).await?,
                1 => {
                    if self.require_service()? {
                        let pb = self.term.spinner("Creating your personalized plan...");
                        let r = self.coach.regenerate(&mut self.session, domain).await;
                        pb.finish_and_clear();
                        self.report(r)?;
                    }
                }
                2 => self.export(domain)?,
                _ => return Ok(()),
            }
        }
    }

    async fn generate(&mut self, domain: Domain) -> io::Result<()> {
        if !self.require_service()? {
            return Ok(());
        }
        let Some(form) = form_for(domain) else {
            return Ok(());
        };
        let raw = self.term.collect_form(form, self.session.user_profile())?;
        let pb = self.term.spinner("Creating your personalized plan...");
        let r = self.coach.submit_plan(&mut self.session, domain, &raw).await;
        pb.finish_and_clear();
        self.report(r)
    }

    async fn chat_view(&mut self) -> io::Result<()> {
        loop {
            self.show(View::Chat)?;
            let msg = self.term.ask_line("You (blank to go back): ")?;
            if msg.is_empty() {
                return Ok(());
            }
            if !self.require_service()? {
                return Ok(());
            }
            let pb = self.term.spinner("Thinking...");
            let r = self.coach.ask(&mut self.session, &msg).await;
            pb.finish_and_clear();
            self.report(r)?;
        }
    }

    fn calculator_view(&mut self) -> io::Result<()> {
        self.show(View::Calculator)?;
        if !self.term.confirm("Enter your details now?")? {
            return Ok(());
        }
        let known = self.session.user_profile();
        let start = |name: &str, fallback: f64| match known.get(name) {
            Some(FieldValue::Int(n)) => *n as f64,
            _ => fallback,
        };
        let (w, h, a) = (start("weight", 70.0), start("height", 170.0), start("age", 25.0));
        let weight_kg = self.term.ask_float("Weight (kg)", 20.0, 300.0, w)?;
        let height_cm = self.term.ask_float("Height (cm)", 100.0, 250.0, h)?;
        let age_years = self.term.ask_float("Age", 10.0, 120.0, a)?;
        let sex = match self.term.ask_choice("Sex", &["Male", "Female"], 0)? {
            0 => Sex::Male,
            _ => Sex::Female,
        };
        let current = match known.get("activity_level") {
            Some(FieldValue::Text(t)) => {
                ActivityLevel::ALL.iter().position(|l| l.label() == t.as_str()).unwrap_or(0)
            }
            _ => 0,
        };
        let level = self.term.ask_choice("Activity Level", ActivityLevel::LABELS, current)?;
        let activity = ActivityLevel::ALL[level];
        match energy_targets(&BodyMetrics { weight_kg, height_cm, age_years, sex, activity }) {
            Ok(t) => self.term.paint(&targets_screen(&t)),
            Err(e) => self.term.message(Tone::Warning, &e.to_string()),
        }
    }

    fn trackers_view(&mut self) -> io::Result<()> {
        loop {
            self.show(View::Trackers)?;
            match self.term.menu("Actions", &TRACKER_ACTIONS)? {
                0 => {
                    let step = self.cfg.water_step_ml;
                    let total = self.session.increment_counter(WATER_COUNTER, step);
                    if total >= self.cfg.water_goal_ml {
                        self.term.message(Tone::Success, "Daily water goal reached!")?;
                    }
                }
                1 => {
                    self.session.reset_counter(WATER_COUNTER);
                }
                2 => self.log_sleep()?,
                _ => return Ok(()),
            }
        }
    }

    fn log_sleep(&mut self) -> io::Result<()> {
        let today = Local::now().date_naive();
        let date = loop {
            let s = self.term.ask_line(&format!("Date (YYYY-MM-DD, blank = {today}): "))?;
            if s.is_empty() {
                break today;
            }
            match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                Ok(d) => break d,
                Err(_) => self.term.message(Tone::Warning, "Use the format YYYY-MM-DD.")?,
            }
        };
        let hours = self.term.ask_float("Hours slept", 0.0, 24.0, 8.0)? as f32;
        let quality = self.term.ask_choice("Sleep quality", &SLEEP_QUALITY, 2)? as u8 + 1;
        match SleepEntry::new(date, hours, quality) {
            Ok(entry) => {
                self.session.log_sleep(entry);
                self.term.message(Tone::Success, "Sleep logged.")
            }
            Err(e) => self.term.message(Tone::Warning, &e.to_string()),
        }
    }

    fn export(&mut self, domain: Domain) -> io::Result<()> {
        let Some(latest) = self.session.latest(domain).cloned() else {
            let msg = format!("No {} plan to download yet.", domain.slug());
            return self.term.message(Tone::Warning, &msg);
        };
        match write_plan(&self.cfg.export_dir, &latest, Local::now().date_naive()) {
            Ok(path) => self.term.message(Tone::Success, &format!("Saved to {}", path.display())),
            Err(e) => self.term.message(Tone::Error, &format!("Could not save the plan: {e:#}")),
        }
    }

    fn enter_api_key(&mut self) -> io::Result<()> {
        let key = self.term.ask_secret(&format!("API key for {:?}: ", self.cfg.provider))?;
        if key.is_empty() {
            return Ok(());
        }
        let mut cfg = self.cfg.clone();
        cfg.api_key = Some(key);
        match GenerationClient::from_config(&cfg) {
            Ok(client) => {
                self.coach.set_client(client);
                self.cfg = cfg;
                self.term.message(Tone::Success, "AI service connected.")
            }
            Err(e) => self.term.message(Tone::Error, &e.to_string()),
        }
    }

    /// Shows the persistent configuration error and returns false when
    /// generation is disabled.
    fn require_service(&mut self) -> io::Result<bool> {
        if self.coach.is_available() {
            return Ok(true);
        }
        if let Some(banner) = status_banner(&self.coach.status(), View::Home) {
            self.term.message(banner.tone, &banner.text)?;
        }
        Ok(false)
    }

    fn report(&mut self, r: Result<Arc<GenerationResult>, CoachError>) -> io::Result<()> {
        match r {
            Ok(result) => {
                if result.domain != Domain::Chat {
                    let msg = format!("Your {} plan is ready!", result.domain.slug());
                    self.term.message(Tone::Success, &msg)?;
                }
                self.term.paint(&render_result(&result))
            }
            Err(CoachError::Validation(e)) => {
                debug!(field = e.field().unwrap_or("-"), "submission rejected");
                self.term.message(Tone::Warning, &e.to_string())
            }
            Err(e) if e.is_persistent() => self.require_service().map(drop),
            Err(e) => self.term.message(Tone::Error, &e.to_string()),
        }
    }

    #[cfg(test)]
    fn finish(self) -> (SessionStore, W) {
        (self.session, self.term.into_output())
    }
}
