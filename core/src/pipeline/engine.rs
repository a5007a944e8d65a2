use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::prepare::CasePreparer;
use super::progress::JudgeProgress;
use super::scheduler::parallel_map_ordered;
use crate::cases::extract_cases;
use crate::config::AnalysisConfig;
use crate::error::PipelineError;
use crate::judge::{
    failed_judge_result, no_judge_result, CasePayload, JudgeOutcome, JudgePlugin, JudgeResult,
};
use crate::report::ReportRow;
use crate::retrieval::TrainingIndex;
use crate::turns::TurnTable;
use crate::validate::PostValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeMode {
    Judge,
    NoJudge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub cases: usize,
    pub judged: usize,
    pub no_judge: usize,
    pub failed: usize,
    pub review_flagged: usize,
}

/// Result of one analysis run: exactly one row per case, in case order.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub run_id: String,
    pub judge_mode: JudgeMode,
    pub judge_name: Option<String>,
    pub stats: RunStats,
    pub rows: Vec<ReportRow>,
}

pub struct AnalysisInput {
    pub run_id: String,
    pub table: TurnTable,
    pub index: TrainingIndex,
    pub judge: Option<Box<dyn JudgePlugin>>,
    pub progress: bool,
}

/// Turns the resolved judge outcome into the final per-case result.
///
/// Only real judge answers are post-validated; fallbacks are final as built.
pub fn resolve_outcome(
    outcome: JudgeOutcome,
    payload: &CasePayload,
    validator: &PostValidator,
) -> JudgeResult {
    match outcome {
        JudgeOutcome::Judged(result) => validator.validate_payload(result, payload),
        JudgeOutcome::NoJudge => no_judge_result(payload),
        JudgeOutcome::Failed(err) => failed_judge_result(payload, &err),
    }
}

/// Stage 1: extract cases and build their payloads on the worker pool.
pub async fn prepare_payloads(
    table: Arc<TurnTable>,
    index: Arc<TrainingIndex>,
    cfg: &AnalysisConfig,
) -> Result<Vec<CasePayload>, PipelineError> {
    let cases = extract_cases(&table);
    let workers = cfg.worker_count();
    let started = Instant::now();

    tracing::info!(
        target: "nomatch.pipeline",
        stage = "pipeline.stage1.start",
        cases = cases.len(),
        workers
    );

    let preparer = CasePreparer::new(table, index, cfg);
    let payloads =
        parallel_map_ordered(cases, workers, move |case| preparer.prepare(&case)).await?;

    tracing::info!(
        target: "nomatch.pipeline",
        stage = "pipeline.stage1.done",
        payloads = payloads.len(),
        elapsed_ms = started.elapsed().as_millis() as u64
    );
    Ok(payloads)
}

/// Probe the judge once; a failure switches the run to no-judge mode.
async fn ready_judge(judge: Option<Box<dyn JudgePlugin>>) -> Option<Box<dyn JudgePlugin>> {
    let mut judge = judge?;
    match judge.warm_up().await {
        Ok(()) => {
            tracing::info!(
                target: "nomatch.pipeline",
                stage = "pipeline.judge.ready",
                judge = judge.name()
            );
            Some(judge)
        }
        Err(e) => {
            tracing::warn!(
                target: "nomatch.pipeline",
                stage = "pipeline.judge.unavailable",
                judge = judge.name(),
                error = %e,
                "judge failed to initialize; continuing without judge"
            );
            None
        }
    }
}

/// Stage 2: judge payloads strictly one at a time, then post-validate.
pub async fn judge_payloads(
    payloads: &[CasePayload],
    judge: Option<Box<dyn JudgePlugin>>,
    cfg: &AnalysisConfig,
    progress: bool,
) -> (JudgeMode, Option<String>, RunStats, Vec<ReportRow>) {
    let validator = PostValidator::new(cfg);
    let mut judge = ready_judge(judge).await;
    let mode = if judge.is_some() {
        JudgeMode::Judge
    } else {
        JudgeMode::NoJudge
    };
    let judge_name = judge.as_ref().map(|j| j.name().to_string());

    let monitor = JudgeProgress::new(payloads.len(), progress);
    let mut stats = RunStats {
        cases: payloads.len(),
        ..RunStats::default()
    };
    let mut rows = Vec::with_capacity(payloads.len());

    tracing::info!(
        target: "nomatch.pipeline",
        stage = "pipeline.stage2.start",
        cases = payloads.len(),
        mode = ?mode
    );

    for payload in payloads {
        let outcome = match judge.as_mut() {
            Some(j) => JudgeOutcome::from_result(j.judge(payload).await),
            None => JudgeOutcome::NoJudge,
        };

        match &outcome {
            JudgeOutcome::Judged(_) => stats.judged += 1,
            JudgeOutcome::NoJudge => stats.no_judge += 1,
            JudgeOutcome::Failed(e) => {
                stats.failed += 1;
                tracing::warn!(
                    target: "nomatch.pipeline",
                    stage = "pipeline.judge.case_failed",
                    case_id = %payload.case_id,
                    kind = e.kind(),
                    error = %e
                );
            }
        }
        monitor.case_done(&payload.case_id, outcome.label());

        let result = resolve_outcome(outcome, payload, &validator);
        if result.review_flag {
            stats.review_flagged += 1;
        }
        rows.push(ReportRow::from_parts(payload, result));
    }

    monitor.finish("done");
    tracing::info!(
        target: "nomatch.pipeline",
        stage = "pipeline.stage2.done",
        judged = stats.judged,
        no_judge = stats.no_judge,
        failed = stats.failed,
        review_flagged = stats.review_flagged
    );

    (mode, judge_name, stats, rows)
}

/// Full case analysis: parallel preprocessing, then the sequential judge.
pub async fn run_analysis(
    input: AnalysisInput,
    cfg: &AnalysisConfig,
) -> Result<AnalysisRun, PipelineError> {
    let AnalysisInput {
        run_id,
        table,
        index,
        judge,
        progress,
    } = input;

    let payloads = prepare_payloads(Arc::new(table), Arc::new(index), cfg).await?;
    let (judge_mode, judge_name, stats, rows) =
        judge_payloads(&payloads, judge, cfg, progress).await;

    Ok(AnalysisRun {
        run_id,
        judge_mode,
        judge_name,
        stats,
        rows,
    })
}
