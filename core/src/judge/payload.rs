use serde::{Deserialize, Serialize};

use crate::flow_context::ContextEntry;
use crate::retrieval::CandidateIntent;
use crate::signals::SlotSignal;

/// Everything the judge sees about one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasePayload {
    pub case_id: String,
    pub session_id: String,
    pub date: String,
    pub flow_ref: String,
    pub last_valid_intent: String,
    /// Oldest first.
    pub context_messages: Vec<ContextEntry>,
    pub trigger_text: String,
    pub trigger_text_normalized: String,
    pub bot_no_match_text: String,
    pub slot_signals: Vec<SlotSignal>,
    pub candidates: Vec<CandidateIntent>,
}

impl CasePayload {
    pub fn top_candidate(&self) -> Option<&CandidateIntent> {
        self.candidates.first()
    }
}
