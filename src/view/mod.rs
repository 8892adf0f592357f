//! Pure rendering: a view plus a read-only snapshot of the session becomes a
//! [`Screen`] description. Painting it is `ux`'s job.

use chrono::{DateTime, Local};

use crate::calculator::{energy_targets, BodyMetrics, EnergyTargets};
use crate::coach::ServiceStatus;
use crate::profile::{form_for, ChatRole, Domain};
use crate::session::{GenerationResult, SessionStore, WATER_COUNTER};

pub const TRAINING_TIPS: &[&str] = &[
    "Start Slowly: Begin with lighter weights and gradually increase",
    "Focus on Form: Proper technique prevents injury and maximizes results",
    "Stay Consistent: Regular workouts are more effective than sporadic intense sessions",
    "Listen to Your Body: Rest when you need it, push when you can",
    "Track Progress: Keep a workout log to monitor improvements",
    "Warm Up & Cool Down: Always include proper warm-up and stretching",
    "Stay Hydrated: Drink water before, during, and after workouts",
    "Get Adequate Rest: Muscles grow during rest, not just during workouts",
];

pub const NUTRITION_TIPS: &[&str] = &[
    "Gradual Changes: Make small, sustainable changes rather than drastic overhauls",
    "Stay Hydrated: Aim for 8-10 glasses of water daily",
    "Portion Control: Use smaller plates and listen to hunger cues",
    "Meal Timing: Eat regular meals to maintain stable energy levels",
    "Read Labels: Understand nutritional information on packaged foods",
    "Cook at Home: Prepare meals when possible for better control",
    "Track Progress: Keep a food diary or use nutrition apps",
    "Be Patient: Lasting changes take time - focus on consistency over perfection",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Training,
    Nutrition,
    Chat,
    Calculator,
    Trackers,
    History,
}

impl View {
    #[cfg(test)]
    pub const MENU: [View; 7] = [
        View::Home,
        View::Training,
        View::Nutrition,
        View::Chat,
        View::Calculator,
        View::Trackers,
        View::History,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Training => "Training Plan",
            View::Nutrition => "Nutrition Plan",
            View::Chat => "Coach Chat",
            View::Calculator => "Calorie Calculator",
            View::Trackers => "Water & Sleep Trackers",
            View::History => "Plan History",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub tone: Tone,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Bullets(Vec<String>),
    Metric { label: String, value: String },
    Gauge { label: String, current: i64, goal: i64, unit: &'static str },
    Plan { title: String, generated_at: String, body: String },
    Tips { title: String, items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub title: String,
    pub subtitle: Option<String>,
    pub banner: Option<Banner>,
    pub blocks: Vec<Block>,
}

impl Screen {
    fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), subtitle: None, banner: None, blocks: Vec::new() }
    }

    fn subtitle(mut self, s: impl Into<String>) -> Self {
        self.subtitle = Some(s.into());
        self
    }

    fn push(&mut self, b: Block) {
        self.blocks.push(b);
    }

    fn heading(&mut self, s: &str) {
        self.push(Block::Heading(s.to_string()));
    }

    fn metric(&mut self, label: &str, value: impl Into<String>) {
        self.push(Block::Metric { label: label.to_string(), value: value.into() });
    }
}

/// Everything a view may read.
pub struct Snapshot<'a> {
    pub session: &'a SessionStore,
    pub status: &'a ServiceStatus,
    pub water_goal_ml: i64,
    pub history_display: usize,
}

pub fn render(view: View, snap: &Snapshot<'_>) -> Screen {
    let mut screen = match view {
        View::Home => home(snap),
        View::Training => plan_page(Domain::Training, snap),
        View::Nutrition => plan_page(Domain::Nutrition, snap),
        View::Chat => chat(snap),
        View::Calculator => calculator(snap),
        View::Trackers => trackers(snap),
        View::History => history(snap),
    };
    if screen.banner.is_none() {
        screen.banner = status_banner(snap.status, view);
    }
    screen
}

/// The screen shown right after a plan (or chat answer) is generated.
pub fn render_result(result: &GenerationResult) -> Screen {
    let mut screen = Screen::new(format!("Your Personalized {} Plan", result.domain.title()));
    if result.domain == Domain::Chat {
        screen.title = "Coach".into();
    }
    screen.push(plan_block(result));
    if let Some((title, tips)) = tips_for(result.domain) {
        let items = tips.iter().map(|t| t.to_string()).collect();
        screen.push(Block::Tips { title: title.into(), items });
    }
    screen
}

fn tips_for(domain: Domain) -> Option<(&'static str, &'static [&'static str])> {
    match domain {
        Domain::Training => Some(("Training Success Tips", TRAINING_TIPS)),
        Domain::Nutrition => Some(("Nutrition Success Tips", NUTRITION_TIPS)),
        Domain::Chat => None,
    }
}

pub fn status_banner(status: &ServiceStatus, view: View) -> Option<Banner> {
    match status {
        ServiceStatus::Unavailable(reason) => Some(Banner {
            tone: Tone::Error,
            text: format!("AI service is not available. {reason}"),
        }),
        ServiceStatus::Connected { provider, model } if view == View::Home => Some(Banner {
            tone: Tone::Success,
            text: format!("AI Service Connected ({provider} / {model})"),
        }),
        ServiceStatus::Connected { .. } => None,
    }
}

fn plan_block(result: &GenerationResult) -> Block {
    Block::Plan {
        title: match result.domain {
            Domain::Chat => "Coach Answer".into(),
            d => format!("Generated {} Plan", d.title()),
        },
        generated_at: stamp(&result.generated_at),
        body: result.text.clone(),
    }
}

fn stamp(t: &DateTime<Local>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn home(snap: &Snapshot<'_>) -> Screen {
    let mut s = Screen::new("AI Fitness Coach")
        .subtitle("Your Personal AI-Powered Fitness and Nutrition Companion");
    s.push(Block::Paragraph(
        "Welcome to your personalized fitness journey! The coach turns your details, goals and \
         lifestyle into customized training and nutrition plans."
            .into(),
    ));
    s.heading("Quick Start");
    s.push(Block::Bullets(vec![
        "Choose a service from the menu".into(),
        "Fill in your personal details".into(),
        "Get your AI-generated plan".into(),
        "Start your fitness journey!".into(),
    ]));

    s.heading("Dashboard");
    s.metric("Session started", stamp(&snap.session.started_at()));
    s.metric("Plans generated this session", snap.session.total_history().to_string());
    for domain in [Domain::Training, Domain::Nutrition] {
        let value = snap
            .session
            .latest(domain)
            .map(|r| stamp(&r.generated_at))
            .unwrap_or_else(|| "none yet".into());
        s.metric(&format!("Latest {} plan", domain.slug()), value);
    }
    s.push(water_gauge(snap));
    s.metric("Average sleep (last 7)", sleep_summary(snap.session));
    if let Some(t) = current_targets(snap.session) {
        push_targets(&mut s, &t);
    }
    s
}

fn plan_page(domain: Domain, snap: &Snapshot<'_>) -> Screen {
    let (title, intro) =
        form_for(domain).map(|f| (f.title, f.intro)).unwrap_or((domain.title(), ""));
    let mut s = Screen::new(title).subtitle(intro);
    match snap.session.latest(domain) {
        Some(latest) => s.push(plan_block(latest)),
        None => {
            let slug = domain.slug();
            let msg = format!("No {slug} plan yet. Fill out the form to generate one.");
            s.push(Block::Paragraph(msg))
        }
    }
    let earlier: Vec<String> = snap
        .session
        .recent_history(domain, snap.history_display + 1)
        .iter()
        .skip(1)
        .map(|r| format!("{}  {}", stamp(&r.generated_at), preview(&r.text)))
        .collect();
    if !earlier.is_empty() {
        s.heading("Earlier plans");
        s.push(Block::Bullets(earlier));
    }
    s
}

fn chat(snap: &Snapshot<'_>) -> Screen {
    let mut s =
        Screen::new("Coach Chat").subtitle("Ask anything about your training or nutrition.");
    let turns = snap.session.transcript();
    if turns.is_empty() {
        s.push(Block::Paragraph("No messages yet.".into()));
    }
    let skip = turns.len().saturating_sub(snap.history_display * 2);
    for t in &turns[skip..] {
        let who = match t.role {
            ChatRole::User => "You",
            ChatRole::Coach => "Coach",
        };
        s.push(Block::Metric { label: who.into(), value: t.text.clone() });
    }
    s
}

fn calculator(snap: &Snapshot<'_>) -> Screen {
    let mut s = Screen::new("Calorie Calculator")
        .subtitle("Mifflin-St Jeor BMR and activity-adjusted TDEE");
    match current_targets(snap.session) {
        Some(t) => push_targets(&mut s, &t),
        None => s.push(Block::Paragraph(
            "Enter your details to calculate, or submit a nutrition profile (male/female) \
             to see your targets here."
                .into(),
        )),
    }
    s
}

fn trackers(snap: &Snapshot<'_>) -> Screen {
    let mut s = Screen::new("Water & Sleep Trackers");
    s.push(water_gauge(snap));
    s.heading("Sleep log");
    let log = snap.session.sleep_log();
    if log.is_empty() {
        s.push(Block::Paragraph("No sleep entries yet.".into()));
    } else {
        let skip = log.len().saturating_sub(7);
        s.push(Block::Bullets(
            log[skip..]
                .iter()
                .map(|e| {
                    let date = e.date.format("%Y-%m-%d");
                    format!("{date}  {:.1} h  quality {}/5", e.hours, e.quality)
                })
                .collect(),
        ));
        s.metric("Average (last 7)", sleep_summary(snap.session));
    }
    s
}

fn history(snap: &Snapshot<'_>) -> Screen {
    let mut s = Screen::new("Plan History");
    for domain in Domain::ALL {
        let total = snap.session.history(domain).len();
        s.heading(&format!("{} ({total})", domain.title()));
        let recent = snap.session.recent_history(domain, snap.history_display);
        if recent.is_empty() {
            s.push(Block::Paragraph("Nothing yet.".into()));
            continue;
        }
        s.push(Block::Bullets(
            recent
                .iter()
                .map(|r| format!("{}  {}", stamp(&r.generated_at), preview(&r.text)))
                .collect(),
        ));
    }
    s
}

fn water_gauge(snap: &Snapshot<'_>) -> Block {
    Block::Gauge {
        label: "Water today".into(),
        current: snap.session.counter(WATER_COUNTER),
        goal: snap.water_goal_ml,
        unit: "ml",
    }
}

fn sleep_summary(session: &SessionStore) -> String {
    session
        .average_sleep(7)
        .map(|h| format!("{h:.1} h"))
        .unwrap_or_else(|| "no entries".into())
}

fn current_targets(session: &SessionStore) -> Option<EnergyTargets> {
    let profile = session.nutrition_profile()?;
    let metrics = BodyMetrics::try_from(&**profile).ok()?;
    energy_targets(&metrics).ok()
}

pub fn push_targets(s: &mut Screen, t: &EnergyTargets) {
    s.heading("Daily energy");
    s.metric("BMR", format!("{} kcal", EnergyTargets::display_kcal(t.bmr)));
    s.metric("TDEE", format!("{} kcal", EnergyTargets::display_kcal(t.tdee)));
    s.metric("Weight loss target", format!("{} kcal", EnergyTargets::display_kcal(t.weight_loss)));
    s.metric("Weight gain target", format!("{} kcal", EnergyTargets::display_kcal(t.weight_gain)));
}

pub fn targets_screen(t: &EnergyTargets) -> Screen {
    let mut s = Screen::new("Calorie Calculator");
    push_targets(&mut s, t);
    s
}

/// First non-empty line, shortened.
fn preview(text: &str) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let mut out: String = line.chars().take(60).collect();
    if line.chars().count() > 60 {
        out.push_str("...");
    }
    out
}
