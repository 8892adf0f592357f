use anyhow::Context;
use chrono::Local;
use clap::Parser;
use colored::Colorize;

mod app;
mod calculator;
mod cli;
mod coach;
mod config;
mod errors;
mod export;
mod log;
mod profile;
mod prompt;
mod provider;
mod session;
mod ux;
mod view;

use calculator::{energy_targets, BodyMetrics, EnergyTargets};
use cli::{Command, PlanKind};
use profile::{Domain, FormSubmission};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    log::init_tracing(args.verbose);

    let cfg = config::Config::load(&args)?;
    let client = provider::GenerationClient::from_config(&cfg);
    let mut coach = coach::Coach::new(client, cfg.transcripts_dir.clone());

    match args.command {
        None | Some(Command::Interactive) => {
            let mut app = app::App::new(ux::Terminal::stdio(), coach, cfg);
            app.run().await
        }
        Some(Command::Plan { kind, profile, export }) => {
            let domain = match kind {
                PlanKind::Training => Domain::Training,
                PlanKind::Nutrition => Domain::Nutrition,
            };
            let text = fs_err::read_to_string(&profile)?;
            let raw: FormSubmission =
                toml::from_str(&text).with_context(|| format!("invalid profile file {profile}"))?;

            let mut session = session::SessionStore::new();
            let result = coach.submit_plan(&mut session, domain, &raw).await?;
            println!("{}", export::render_plan_text(&result));
            if export {
                let path = export::write_plan(&cfg.export_dir, &result, Local::now().date_naive())?;
                eprintln!("{} {}", "saved".green().bold(), path.display());
            }
            Ok(())
        }
        Some(Command::Bmr { weight, height, age, sex, activity }) => {
            let metrics = BodyMetrics {
                weight_kg: weight,
                height_cm: height,
                age_years: age,
                sex,
                activity,
            };
            let t = energy_targets(&metrics)?;
            let rows = [
                ("BMR".to_string(), t.bmr),
                (format!("TDEE ({})", activity.label()), t.tdee),
                ("Weight loss".to_string(), t.weight_loss),
                ("Weight gain".to_string(), t.weight_gain),
            ];
            for (label, kcal) in rows {
                let kcal = EnergyTargets::display_kcal(kcal);
                println!("{} {kcal} kcal", format!("{label:<28}").bold());
            }
            Ok(())
        }
    }
}
