use std::collections::HashMap;

use super::model::Turn;
use crate::error::InputError;

/// Validated, read-only set of turns with a per-session index.
///
/// Built once before any processing and shared by every worker.
#[derive(Debug, Clone, Default)]
pub struct TurnTable {
    turns: Vec<Turn>,
    by_session: HashMap<String, Vec<usize>>,
}

impl TurnTable {
    /// Validates the turn contract: non-empty session ids and strictly
    /// increasing `turn_index` per session in input order.
    pub fn new(turns: Vec<Turn>) -> Result<Self, InputError> {
        let mut by_session: HashMap<String, Vec<usize>> = HashMap::new();

        for (position, turn) in turns.iter().enumerate() {
            if turn.session_id.trim().is_empty() {
                return Err(InputError::EmptySessionId { position });
            }
            let slots = by_session.entry(turn.session_id.clone()).or_default();
            if let Some(&prev) = slots.last() {
                let previous = turns[prev].turn_index;
                if turn.turn_index <= previous {
                    return Err(InputError::NonIncreasingTurnIndex {
                        session_id: turn.session_id.clone(),
                        previous,
                        current: turn.turn_index,
                    });
                }
            }
            slots.push(position);
        }

        tracing::debug!(
            target: "nomatch.turns",
            stage = "turns.table.built",
            turns = turns.len(),
            sessions = by_session.len()
        );

        Ok(Self { turns, by_session })
    }

    /// All turns in input order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn session_count(&self) -> usize {
        self.by_session.len()
    }

    /// Turns of one session, ascending by `turn_index`.
    pub fn session(&self, session_id: &str) -> impl DoubleEndedIterator<Item = &Turn> + '_ {
        self.by_session
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.turns[i])
    }
}
