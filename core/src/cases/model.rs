use serde::{Deserialize, Serialize};

use crate::turns::Turn;

/// A NO_MATCH event paired with the user turn that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// `{session_id}:{no_match_turn_index}`
    pub case_id: String,
    pub session_id: String,
    pub date: String,
    pub no_match_turn: Turn,
    pub trigger_turn: Option<Turn>,
    pub trigger_text: String,
    pub trigger_text_normalized: String,
}

impl Case {
    pub fn case_id_for(session_id: &str, turn_index: u32) -> String {
        format!("{session_id}:{turn_index}")
    }

    pub fn trigger_index(&self) -> Option<u32> {
        self.trigger_turn.as_ref().map(|t| t.turn_index)
    }
}
