use anyhow::Context;
use nomatch_core::api::{aggregate, format_aggregate_text, CliError};

use super::cli::{AggregateArgs, SummaryFormat};
use crate::io::{expand_path, read_rows};

/// `nomatch aggregate`: rebuild the flow/intent summary from saved rows.
pub fn run_aggregate(args: AggregateArgs) -> Result<i32, CliError> {
    let rows = read_rows(&expand_path(&args.input))?;
    let summary = aggregate(&rows);

    let body = match args.format {
        SummaryFormat::Text => format_aggregate_text(&summary),
        SummaryFormat::Json => serde_json::to_string_pretty(&summary).context("serialize summary")?,
    };

    match args.out.as_deref() {
        Some(path) => {
            let path = expand_path(path);
            std::fs::write(&path, body)?;
            tracing::info!(
                target: "nomatch.cli",
                stage = "cli.aggregate.written",
                path = %path.display(),
                cases = summary.total_cases
            );
        }
        None => println!("{body}"),
    }
    Ok(0)
}
