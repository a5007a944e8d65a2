use super::model::Case;
use crate::turns::{Speaker, Turn, TurnTable};

/// One case per bot turn whose intent starts with `NO_MATCH`, in discovery
/// order. A case without a preceding user turn is still emitted, with empty
/// trigger text.
pub fn extract_cases(table: &TurnTable) -> Vec<Case> {
    let cases: Vec<Case> = table
        .turns()
        .iter()
        .filter(|t| t.speaker == Speaker::Bot && t.is_no_match)
        .map(|no_match| {
            let trigger = nearest_user_turn(table, no_match).cloned();
            let (trigger_text, trigger_text_normalized) = trigger
                .as_ref()
                .map(|t| (t.text.clone(), t.normalized_text.clone()))
                .unwrap_or_default();
            Case {
                case_id: Case::case_id_for(&no_match.session_id, no_match.turn_index),
                session_id: no_match.session_id.clone(),
                date: no_match.date.clone(),
                no_match_turn: no_match.clone(),
                trigger_turn: trigger,
                trigger_text,
                trigger_text_normalized,
            }
        })
        .collect();

    let orphans = cases.iter().filter(|c| c.trigger_turn.is_none()).count();
    tracing::info!(
        target: "nomatch.cases",
        stage = "cases.extracted",
        cases = cases.len(),
        without_trigger = orphans
    );
    cases
}

fn nearest_user_turn<'a>(table: &'a TurnTable, no_match: &Turn) -> Option<&'a Turn> {
    table
        .session(&no_match.session_id)
        .rev()
        .skip_while(|t| t.turn_index >= no_match.turn_index)
        .find(|t| t.is_user())
}
