use chrono::{DateTime, Local};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::profile::Domain;

/// Logs go to stderr so they never interleave with the terminal UI on
/// stdout. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "fitness_coach=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    // An already installed global subscriber keeps receiving events.
    if let Err(e) = installed {
        if verbose {
            eprintln!("debug: tracing subscriber not installed: {e}");
        }
    }
}

#[derive(Debug)]
pub struct SavedPaths {
    pub request: PathBuf,
    pub response: PathBuf,
}

#[derive(Serialize)]
struct RequestArtifact<'a> {
    session: Uuid,
    domain: Domain,
    provider: &'a str,
    model: &'a str,
    prompt: &'a str,
}

#[derive(Serialize)]
struct ResponseArtifact<'a> {
    result: Uuid,
    generated_at: DateTime<Local>,
    completion: &'a str,
}

pub struct Exchange<'a> {
    pub seq: usize,
    pub domain: Domain,
    pub provider: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
    pub result_id: Uuid,
    pub generated_at: DateTime<Local>,
    pub completion: &'a str,
}

fn session_dir(root: &Path, session: Uuid) -> PathBuf {
    root.join(session.to_string())
}

/// Writes `{seq}-{domain}.request.json` and `.response.json` under the
/// session's directory.
pub fn save_exchange(root: &Path, session: Uuid, ex: &Exchange<'_>) -> anyhow::Result<SavedPaths> {
    let dir = session_dir(root, session);
    fs::create_dir_all(&dir)?;
    let stem = format!("{:03}-{}", ex.seq, ex.domain.slug());

    let request = dir.join(format!("{stem}.request.json"));
    fs::write(
        &request,
        to_string_pretty(&RequestArtifact {
            session,
            domain: ex.domain,
            provider: ex.provider,
            model: ex.model,
            prompt: ex.prompt,
        })?,
    )?;

    let response = dir.join(format!("{stem}.response.json"));
    fs::write(
        &response,
        to_string_pretty(&ResponseArtifact {
            result: ex.result_id,
            generated_at: ex.generated_at,
            completion: ex.completion,
        })?,
    )?;

    Ok(SavedPaths { request, response })
}
