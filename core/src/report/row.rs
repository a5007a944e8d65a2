use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::judge::{CasePayload, Decision, JudgeResult};
use crate::retrieval::Evidence;
use crate::signals::SlotSignal;

pub const TOP_EVIDENCE: usize = 3;

/// Flat per-case record handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date: String,
    pub session_id: String,
    pub case_id: String,
    pub trigger_text: String,
    pub bot_no_match_text: String,
    pub flow_ref: String,
    pub last_valid_intent: String,
    pub decision: Decision,
    pub flow_recommended: String,
    pub intent_top: String,
    pub intents_relevantes: Vec<String>,
    pub top_evidence: Vec<Evidence>,
    pub slot_signals: Vec<SlotSignal>,
    pub why: String,
    pub improvements: Vec<String>,
    pub new_training_phrases: BTreeMap<String, Vec<String>>,
    pub suggested_parameters: Vec<serde_json::Value>,
    pub suggested_contexts: Vec<serde_json::Value>,
    pub confidence: f64,
    pub review_flag: bool,
}

impl ReportRow {
    pub fn from_parts(payload: &CasePayload, result: JudgeResult) -> Self {
        let top_evidence = payload
            .top_candidate()
            .map(|c| c.evidence.iter().take(TOP_EVIDENCE).cloned().collect())
            .unwrap_or_default();

        Self {
            date: payload.date.clone(),
            session_id: payload.session_id.clone(),
            case_id: payload.case_id.clone(),
            trigger_text: payload.trigger_text.clone(),
            bot_no_match_text: payload.bot_no_match_text.clone(),
            flow_ref: payload.flow_ref.clone(),
            last_valid_intent: payload.last_valid_intent.clone(),
            intent_top: result.intent_top().to_string(),
            decision: result.decision,
            flow_recommended: result.flow_recommended,
            intents_relevantes: result.intents_relevantes,
            top_evidence,
            slot_signals: payload.slot_signals.clone(),
            why: result.why,
            improvements: result.improvements,
            new_training_phrases: result.new_training_phrases,
            suggested_parameters: result.suggested_parameters,
            suggested_contexts: result.suggested_contexts,
            confidence: result.confidence,
            review_flag: result.review_flag,
        }
    }
}
