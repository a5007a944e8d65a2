use std::sync::Arc;

use crate::cases::Case;
use crate::config::AnalysisConfig;
use crate::flow_context::FlowContextResolver;
use crate::judge::CasePayload;
use crate::retrieval::{Retriever, TrainingIndex};
use crate::signals::detect_slot_signals;
use crate::turns::TurnTable;

/// Per-case preprocessing over read-only shared inputs.
///
/// Cheap to clone; every worker gets its own handle to the same table and
/// index.
#[derive(Debug, Clone)]
pub struct CasePreparer {
    table: Arc<TurnTable>,
    resolver: FlowContextResolver,
    retriever: Retriever,
}

impl CasePreparer {
    pub fn new(table: Arc<TurnTable>, index: Arc<TrainingIndex>, cfg: &AnalysisConfig) -> Self {
        Self {
            table,
            resolver: FlowContextResolver::new(cfg),
            retriever: Retriever::new(index, cfg),
        }
    }

    /// Flow, context window, candidates and slot signals for one case.
    pub fn prepare(&self, case: &Case) -> CasePayload {
        let flow = self.resolver.infer_flow_ref(&self.table, case);
        let context_messages =
            self.resolver
                .build_context_window(&self.table, case, &flow.flow_ref);
        let candidates = self
            .retriever
            .retrieve(&case.trigger_text_normalized, &flow.flow_ref);
        let slot_signals = detect_slot_signals(&case.trigger_text_normalized);

        CasePayload {
            case_id: case.case_id.clone(),
            session_id: case.session_id.clone(),
            date: case.date.clone(),
            flow_ref: flow.flow_ref,
            last_valid_intent: flow.last_valid_intent,
            context_messages,
            trigger_text: case.trigger_text.clone(),
            trigger_text_normalized: case.trigger_text_normalized.clone(),
            bot_no_match_text: case.no_match_turn.text.clone(),
            slot_signals,
            candidates,
        }
    }
}
