use thiserror::Error;

/// Failure of the judging collaborator, either at start-up (`Unavailable`)
/// or for a single case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JudgeError {
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    #[error("judge transport error: {0}")]
    Transport(String),

    #[error("judge timed out after {0}ms")]
    Timeout(u64),

    #[error("judge returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("judge output is not valid JSON: {0}")]
    Malformed(String),
}

impl JudgeError {
    /// Short stable tag used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
        }
    }
}
