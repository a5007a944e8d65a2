//! File ingestion and result emission. The core crate never touches the
//! filesystem; everything path-shaped lives here.
pub mod output;
pub mod training;
pub mod turns;

use std::path::PathBuf;

use nomatch_core::api::InputError;

pub use output::{read_rows, render_rows, write_out_dir, RunManifest};
pub use training::{read_training, read_training_csv};
pub use turns::{read_turns, read_turns_csv, read_turns_jsonl};

/// `~` and `$VAR` expansion for user-supplied paths.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(raw).into_owned());
    PathBuf::from(expanded)
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
}

fn require_column(
    headers: &csv::StringRecord,
    aliases: &[&str],
    source_name: &str,
) -> Result<usize, InputError> {
    find_column(headers, aliases).ok_or_else(|| InputError::MissingColumn {
        source_name: source_name.to_string(),
        column: aliases.join("|"),
    })
}

fn csv_error(err: csv::Error, source_name: &str) -> InputError {
    InputError::Malformed {
        source_name: source_name.to_string(),
        line: err.position().map(|p| p.line() as usize).unwrap_or(0),
        message: err.to_string(),
    }
}
