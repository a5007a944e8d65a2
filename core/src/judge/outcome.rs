use super::payload::CasePayload;
use super::types::{Decision, JudgeResult};
use crate::error::JudgeError;

pub const NO_JUDGE_CONFIDENCE: f64 = 0.5;
pub const NO_JUDGE_NOTE: &str =
    "No judge available (disabled or failed to initialize); recommendation is the top retrieval candidate";

/// What the judge stage produced for one case.
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeOutcome {
    Judged(JudgeResult),
    /// The judge is unavailable for the whole run.
    NoJudge,
    /// The judge is available but failed on this case.
    Failed(JudgeError),
}

impl JudgeOutcome {
    pub fn from_result(res: Result<JudgeResult, JudgeError>) -> Self {
        match res {
            Ok(r) => JudgeOutcome::Judged(r),
            Err(e) => JudgeOutcome::Failed(e),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JudgeOutcome::Judged(_) => "judged",
            JudgeOutcome::NoJudge => "no_judge",
            JudgeOutcome::Failed(_) => "failed",
        }
    }
}

fn candidate_intents(payload: &CasePayload) -> Vec<String> {
    payload.candidates.iter().map(|c| c.intent.clone()).collect()
}

/// Deterministic result when no judge is available: the top candidate is
/// recommended with medium confidence and flagged for review.
pub fn no_judge_result(payload: &CasePayload) -> JudgeResult {
    JudgeResult {
        decision: Decision::Ambiguous,
        flow_recommended: payload.flow_ref.clone(),
        intent_recommended: payload
            .top_candidate()
            .map(|c| vec![c.intent.clone()])
            .unwrap_or_default(),
        intents_relevantes: candidate_intents(payload),
        why: NO_JUDGE_NOTE.to_string(),
        confidence: NO_JUDGE_CONFIDENCE,
        review_flag: true,
        ..JudgeResult::default()
    }
}

/// Result for a case whose judge call failed; the error becomes the
/// explanation.
pub fn failed_judge_result(payload: &CasePayload, err: &JudgeError) -> JudgeResult {
    JudgeResult {
        decision: Decision::Ambiguous,
        flow_recommended: payload.flow_ref.clone(),
        intent_recommended: Vec::new(),
        intents_relevantes: candidate_intents(payload),
        why: err.to_string(),
        confidence: 0.0,
        review_flag: true,
        ..JudgeResult::default()
    }
}
