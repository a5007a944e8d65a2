use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use nomatch_core::api::{
    format_text, rows_to_json, rows_to_jsonl, AggregatedReport, AnalysisRun, CliError, JudgeMode,
    OutputFormat, ReportRow, RunStats,
};
use serde::Serialize;

pub const ROWS_FILE: &str = "analysis.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";
pub const MANIFEST_FILE: &str = "run.json";

/// Bookkeeping written next to the rows of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub run_id: String,
    pub judge_mode: JudgeMode,
    pub judge_name: Option<String>,
    pub stats: RunStats,
    pub turns_file: String,
    pub training_file: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunManifest {
    pub fn new(
        run: &AnalysisRun,
        turns_file: &Path,
        training_file: &Path,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: run.run_id.clone(),
            judge_mode: run.judge_mode,
            judge_name: run.judge_name.clone(),
            stats: run.stats.clone(),
            turns_file: turns_file.display().to_string(),
            training_file: training_file.display().to_string(),
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Rows as printed on stdout. The summary is only rendered by `text`.
pub fn render_rows(
    rows: &[ReportRow],
    summary: Option<&AggregatedReport>,
    format: OutputFormat,
) -> Result<String, CliError> {
    let out = match format {
        OutputFormat::Json => rows_to_json(rows).context("serialize rows")?,
        OutputFormat::Jsonl => rows_to_jsonl(rows).context("serialize rows")?,
        OutputFormat::Text => format_text(rows, summary),
    };
    Ok(out)
}

/// Writes rows, summary (when given) and manifest; returns the paths written.
pub fn write_out_dir(
    dir: &Path,
    rows: &[ReportRow],
    summary: Option<&AggregatedReport>,
    manifest: &RunManifest,
) -> Result<Vec<PathBuf>, CliError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let rows_path = dir.join(ROWS_FILE);
    std::fs::write(&rows_path, rows_to_jsonl(rows).context("serialize rows")?)?;
    written.push(rows_path);

    if let Some(summary) = summary {
        let path = dir.join(SUMMARY_FILE);
        let body = serde_json::to_string_pretty(summary).context("serialize summary")?;
        std::fs::write(&path, body)?;
        written.push(path);
    }

    let path = dir.join(MANIFEST_FILE);
    let body = serde_json::to_string_pretty(manifest).context("serialize manifest")?;
    std::fs::write(&path, body)?;
    written.push(path);

    tracing::info!(
        target: "nomatch.cli",
        stage = "output.written",
        dir = %dir.display(),
        files = written.len(),
        rows = rows.len()
    );
    Ok(written)
}

/// Loads rows back from an `analysis.jsonl` file.
pub fn read_rows(path: &Path) -> Result<Vec<ReportRow>, CliError> {
    let text = std::fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: ReportRow = serde_json::from_str(line)
            .with_context(|| format!("{} line {}", path.display(), i + 1))?;
        rows.push(row);
    }
    Ok(rows)
}
