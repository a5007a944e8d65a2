use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cases::Case;
use crate::config::AnalysisConfig;
use crate::turns::{Speaker, TurnTable};

pub const UNKNOWN_FLOW: &str = "UNKNOWN";
pub const NO_MATCH_FLOW: &str = "NO_MATCH";
pub const CHIT_FLOW: &str = "CHIT";

/// Active topic of a case and the intent it was last seen under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRef {
    pub flow_ref: String,
    pub last_valid_intent: String,
}

impl FlowRef {
    pub fn unknown() -> Self {
        Self {
            flow_ref: UNKNOWN_FLOW.to_string(),
            last_valid_intent: String::new(),
        }
    }

    /// Known flows other than chit-chat take part in affinity and
    /// consistency checks.
    pub fn is_specific(&self) -> bool {
        is_specific_flow(&self.flow_ref)
    }
}

pub fn is_specific_flow(flow_ref: &str) -> bool {
    !flow_ref.is_empty() && flow_ref != UNKNOWN_FLOW && flow_ref != CHIT_FLOW
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub speaker: Speaker,
    pub text: String,
    pub intent: String,
}

/// Infers the conversational flow of a case and the bounded window of
/// turns that belong to it.
#[derive(Debug, Clone)]
pub struct FlowContextResolver {
    neutral_flows: BTreeSet<String>,
    max_messages: usize,
}

impl FlowContextResolver {
    pub fn new(cfg: &AnalysisConfig) -> Self {
        Self {
            neutral_flows: cfg.neutral_flows.clone(),
            max_messages: cfg.max_context_messages,
        }
    }

    fn is_neutral(&self, flow: &str) -> bool {
        self.neutral_flows.contains(flow)
    }

    /// Scans backward from the turn before the trigger, skipping turns
    /// without intent and NO_MATCH turns. Returns at the first non-neutral
    /// flow. When only neutral flows are found, the most recent one is kept
    /// and `last_valid_intent` is the oldest intent scanned. `UNKNOWN` when
    /// no turn carries an intent.
    pub fn infer_flow_ref(&self, table: &TurnTable, case: &Case) -> FlowRef {
        let Some(trigger_index) = case.trigger_index() else {
            return FlowRef::unknown();
        };

        let mut first_seen: Option<&str> = None;
        let mut last_valid_intent: Option<&str> = None;

        for turn in table
            .session(&case.session_id)
            .rev()
            .filter(|t| t.turn_index < trigger_index)
        {
            if turn.detected_intent.is_empty() || turn.flow == NO_MATCH_FLOW {
                continue;
            }
            last_valid_intent = Some(&turn.detected_intent);
            if !turn.flow.is_empty() && !self.is_neutral(&turn.flow) {
                return FlowRef {
                    flow_ref: turn.flow.clone(),
                    last_valid_intent: turn.detected_intent.clone(),
                };
            }
            first_seen.get_or_insert(turn.flow.as_str());
        }

        match (first_seen, last_valid_intent) {
            (Some(flow), Some(intent)) => FlowRef {
                flow_ref: flow.to_string(),
                last_valid_intent: intent.to_string(),
            },
            _ => FlowRef::unknown(),
        }
    }

    /// Backward window from the trigger (inclusive), oldest first.
    ///
    /// A turn is an outlier when its flow is present, not neutral and not
    /// `flow_ref`. Scanning stops, without keeping the current turn, once two
    /// outliers were seen overall or two of the last three scanned turns were
    /// outliers. At most `max_context_messages` turns are scanned.
    pub fn build_context_window(
        &self,
        table: &TurnTable,
        case: &Case,
        flow_ref: &str,
    ) -> Vec<ContextEntry> {
        let Some(trigger_index) = case.trigger_index() else {
            return Vec::new();
        };

        let mut window = Vec::new();
        let mut outliers = 0usize;
        let mut recent: Vec<u8> = Vec::with_capacity(4);

        for (scanned, turn) in table
            .session(&case.session_id)
            .rev()
            .filter(|t| t.turn_index <= trigger_index)
            .enumerate()
        {
            if scanned >= self.max_messages {
                break;
            }
            if turn.flow == NO_MATCH_FLOW {
                continue;
            }

            let is_outlier =
                !turn.flow.is_empty() && !self.is_neutral(&turn.flow) && turn.flow != flow_ref;
            if is_outlier {
                outliers += 1;
            }
            recent.push(u8::from(is_outlier));
            if recent.len() > 3 {
                recent.remove(0);
            }

            let recent_outliers: u8 = recent.iter().sum();
            if outliers >= 2 || (recent.len() >= 2 && recent_outliers >= 2) {
                tracing::trace!(
                    target: "nomatch.flow",
                    stage = "flow.window.cutoff",
                    case_id = %case.case_id,
                    turn_index = turn.turn_index,
                    flow = %turn.flow
                );
                break;
            }

            window.push(ContextEntry {
                speaker: turn.speaker,
                text: turn.text.clone(),
                intent: turn.detected_intent.clone(),
            });
        }

        window.reverse();
        window
    }
}
