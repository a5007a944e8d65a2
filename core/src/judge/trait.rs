use async_trait::async_trait;

use super::payload::CasePayload;
use super::types::JudgeResult;
use crate::error::JudgeError;

/// External classifier of NO_MATCH cases.
///
/// Implementations hold an exclusive resource and are driven strictly one
/// case at a time, hence `&mut self`.
#[async_trait]
pub trait JudgePlugin: Send {
    fn name(&self) -> &str;

    /// Probe run once before the first case. An error switches the whole run
    /// to no-judge mode.
    async fn warm_up(&mut self) -> Result<(), JudgeError>;

    async fn judge(&mut self, payload: &CasePayload) -> Result<JudgeResult, JudgeError>;
}
