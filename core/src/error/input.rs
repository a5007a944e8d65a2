use thiserror::Error;

/// Fatal problems with the turn or training input. Any of these aborts the
/// run before a single case is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("record {position}: session_id is empty")]
    EmptySessionId { position: usize },

    #[error("record {position}: unknown speaker tag '{tag}' (expected user or bot)")]
    UnknownSpeaker { position: usize, tag: String },

    #[error(
        "session '{session_id}': turn_index {current} does not follow {previous} (must be strictly increasing)"
    )]
    NonIncreasingTurnIndex {
        session_id: String,
        previous: u32,
        current: u32,
    },

    #[error("{source_name}: missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name} line {line}: {message}")]
    Malformed {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("training record {position}: intent is empty")]
    EmptyIntent { position: usize },
}
