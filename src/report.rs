//! Plain-text export of a finished run.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::session::record::{ScoreRecord, User};
use crate::ui::components::results_panel::DISCLAIMER;

const RULE: &str = "------------------------------------------------------------";

pub fn render_text(user: Option<&User>, records: &[ScoreRecord], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "PRO EVAL ASSESSMENT REPORT");
    let _ = writeln!(out, "{RULE}");
    match user {
        Some(u) => {
            let _ = writeln!(out, "Player:    {}", u.username);
            let _ = writeln!(
                out,
                "Started:   {}",
                u.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
        }
        None => {
            let _ = writeln!(out, "Player:    -");
        }
    }
    let _ = writeln!(
        out,
        "Generated: {}",
        generated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Tests:     {}", records.len());
    let _ = writeln!(out, "{RULE}");

    let level_w = records.iter().map(|r| r.level_name.chars().count()).max().unwrap_or(5).max(5);
    let test_w = records.iter().map(|r| r.test_name.chars().count()).max().unwrap_or(4).max(4);
    let _ = writeln!(out, "{:<level_w$}  {:<test_w$}  Score", "Level", "Test");
    for r in records {
        let _ = writeln!(
            out,
            "{:<level_w$}  {:<test_w$}  {} {}",
            r.level_name, r.test_name, r.display_score, r.unit
        );
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{DISCLAIMER}");
    out
}

/// Keeps `[A-Za-z0-9_-]`, replaces everything else with `_`.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "player".to_string() } else { cleaned }
}

pub fn report_path(data_dir: &Path, username: &str, at: DateTime<Utc>) -> PathBuf {
    let stamp = at.with_timezone(&Local).format("%Y%m%d-%H%M%S");
    data_dir
        .join("reports")
        .join(format!("{}-{stamp}.txt", sanitize_name(username)))
}

/// Writes the report under `<data_dir>/reports/` and returns its path.
pub fn export(
    data_dir: &Path,
    user: Option<&User>,
    records: &[ScoreRecord],
    generated_at: DateTime<Utc>,
) -> Result<PathBuf> {
    let name = user.map(|u| u.username.as_str()).unwrap_or("player");
    let path = report_path(data_dir, name, generated_at);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&path, render_text(user, records, generated_at))
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "report exported");
    Ok(path)
}
