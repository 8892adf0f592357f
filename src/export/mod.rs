use chrono::NaiveDate;
use fs_err as fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::session::GenerationResult;

pub const FOOTER: &str = "Generated by AI Fitness Coach";

/// Plain-text download of a generated plan.
pub fn render_plan_text(result: &GenerationResult) -> String {
    format!(
        "PERSONALIZED {} PLAN\nGenerated on: {}\n\n{}\n\n---\n{}",
        result.domain.slug().to_uppercase(),
        result.generated_at.format("%Y-%m-%d %H:%M:%S"),
        result.text.trim(),
        FOOTER
    )
}

/// `{domain}_plan_{YYYYMMDD}.txt`
pub fn export_filename(result: &GenerationResult, date: NaiveDate) -> String {
    format!("{}_plan_{}.txt", result.domain.slug(), date.format("%Y%m%d"))
}

/// Writes the plan into `dir` (created if missing) and returns its path.
/// A same-day export of the same domain overwrites the earlier file.
pub fn write_plan(
    dir: &Path,
    result: &GenerationResult,
    date: NaiveDate,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(result, date));
    fs::write(&path, render_plan_text(result))?;
    info!(path = %path.display(), domain = result.domain.slug(), "plan exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{FieldValue, FormSubmission, NutritionProfile, Profile};
    use chrono::{Local, TimeZone};
    use std::sync::Arc;

    fn nutrition_result() -> GenerationResult {
        let raw = FormSubmission::new()
            .with("kitchen_equipment", FieldValue::List(vec!["Grill".into()]));
        let nutrition = NutritionProfile::from_submission(&raw).unwrap();
        let profile = Arc::new(Profile::Nutrition(nutrition));
        let at = Local.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap();
        GenerationResult::new(profile, "\n## Day 1\nOats\n".into(), at)
    }

    #[test]
    fn text_has_header_body_and_footer() {
        let text = render_plan_text(&nutrition_result());
        assert_eq!(
            text,
            "PERSONALIZED NUTRITION PLAN\nGenerated on: 2024-05-17 09:30:05\n\n\
             ## Day 1\nOats\n\n---\nGenerated by AI Fitness Coach"
        );
    }

    #[test]
    fn filename_has_domain_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(export_filename(&nutrition_result(), date), "nutrition_plan_20240517.txt");
    }

    #[test]
    fn write_plan_creates_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("plans");
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let path = write_plan(&dir, &nutrition_result(), date).unwrap();
        assert_eq!(path, dir.join("nutrition_plan_20240517.txt"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("PERSONALIZED NUTRITION PLAN\n"));
        assert!(written.ends_with(FOOTER));
    }
}
