use chrono::Utc;
use nomatch_core::api::{aggregate, AppContext, CliError, TrainingIndex};

use super::cli::AnalyzeArgs;
use crate::io::{expand_path, read_training, read_turns, render_rows, write_out_dir, RunManifest};

/// `nomatch analyze`: ingest, run both stages, then print or persist.
///
/// Configuration overrides from `args` must already be applied to `ctx`.
pub async fn run_analyze(args: AnalyzeArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let started_at = Utc::now();
    let turns_path = expand_path(&args.turns);
    let training_path = expand_path(&args.training);

    let table = read_turns(&turns_path)?;
    let index = TrainingIndex::build(read_training(&training_path)?);

    let run = ctx.analyze(table, index).await?;
    let output = &ctx.cfg().output;
    let summary = output.aggregate.then(|| aggregate(&run.rows));

    tracing::info!(
        target: "nomatch.cli",
        stage = "cli.analyze.done",
        run_id = %run.run_id,
        cases = run.stats.cases,
        judged = run.stats.judged,
        failed = run.stats.failed,
        review_flagged = run.stats.review_flagged
    );

    match args.out_dir.as_deref() {
        Some(dir) => {
            let manifest = RunManifest::new(&run, &turns_path, &training_path, started_at);
            let written = write_out_dir(&expand_path(dir), &run.rows, summary.as_ref(), &manifest)?;
            for path in written {
                println!("{}", path.display());
            }
        }
        None => {
            let out = render_rows(&run.rows, summary.as_ref(), output.format)?;
            print!("{out}");
            if !out.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::output::{read_rows, ROWS_FILE, SUMMARY_FILE};
    use nomatch_core::api::AppConfig;

    fn args(dir: &std::path::Path, out_dir: &std::path::Path) -> AnalyzeArgs {
        let turns = dir.join("turns.csv");
        std::fs::write(
            &turns,
            "session_id,speaker,text,intent\n\
             s1,user,cual es el limite de mi tarjeta,Tarjetas_Limite\n\
             s1,bot,Tu limite es 1000,Tarjetas_Limite\n\
             s1,user,y en dolares,\n\
             s1,bot,No entendi,NO_MATCH\n",
        )
        .unwrap();
        let training = dir.join("train.csv");
        std::fs::write(
            &training,
            "intent,phrase\n\
             Tarjetas_Limite,cual es el limite de mi tarjeta\n\
             Tarjetas_Limite,limite de compra en dolares\n\
             Cuentas_Saldo,cual es mi saldo\n",
        )
        .unwrap();

        AnalyzeArgs {
            turns: turns.display().to_string(),
            training: training.display().to_string(),
            max_workers: Some(2),
            no_judge: true,
            judge_url: None,
            format: None,
            out_dir: Some(out_dir.display().to_string()),
            no_aggregate: false,
            no_progress: true,
        }
    }

    #[tokio::test]
    async fn analyze_without_judge_writes_rows_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let args = args(dir.path(), &out);

        let mut cfg = AppConfig::default();
        args.apply_overrides(&mut cfg);
        let ctx = AppContext::new(cfg, None);

        assert_eq!(run_analyze(args, &ctx).await.unwrap(), 0);

        let rows = read_rows(&out.join(ROWS_FILE)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].case_id, "s1:3");
        assert_eq!(rows[0].flow_ref, "Tarjetas");
        assert_eq!(rows[0].intent_top, "Tarjetas_Limite");
        assert!(out.join(SUMMARY_FILE).exists());
    }

    #[tokio::test]
    async fn missing_turn_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), &dir.path().join("out"));
        args.turns = dir.path().join("nope.csv").display().to_string();

        let ctx = AppContext::new(AppConfig::default(), None);
        let err = run_analyze(args, &ctx).await.unwrap_err();
        assert_eq!(err.exit_code(), 20);
    }
}
