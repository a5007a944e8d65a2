use async_trait::async_trait;
use nomatch_core::api::{
    build_judge_prompt, build_repair_prompt, parse_judge_output, CasePayload, ChatJudgeConfig,
    JudgeError, JudgePlugin, JudgeResult, SYSTEM_JSON_ONLY,
};

use super::http_client::{ChatClient, ChatHttpError, Sampling};

/// Judge backed by a chat-completions server.
///
/// A reply that is not a JSON object gets exactly one reformatting retry
/// with deterministic sampling before the case is reported as malformed.
pub struct ChatJudgePlugin {
    client: ChatClient,
    sampling: Sampling,
}

impl ChatJudgePlugin {
    pub fn new(cfg: &ChatJudgeConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: ChatClient::new(cfg)?,
            sampling: Sampling {
                temperature: cfg.temperature,
                top_p: cfg.top_p,
            },
        })
    }

    async fn complete(&self, prompt: &str, sampling: Sampling) -> Result<String, JudgeError> {
        self.client
            .complete(SYSTEM_JSON_ONLY, prompt, sampling)
            .await
            .map_err(|e: ChatHttpError| e.into_judge_error(self.client.timeout_ms()))
    }
}

#[async_trait]
impl JudgePlugin for ChatJudgePlugin {
    fn name(&self) -> &str {
        "chat"
    }

    async fn warm_up(&mut self) -> Result<(), JudgeError> {
        self.client
            .ping()
            .await
            .map_err(|e| JudgeError::Unavailable(e.to_string()))
    }

    async fn judge(&mut self, payload: &CasePayload) -> Result<JudgeResult, JudgeError> {
        tracing::debug!(
            target: "nomatch.judge",
            stage = "judge.case.in",
            case_id = %payload.case_id,
            candidates = payload.candidates.len(),
            model = %self.client.model()
        );

        let text = self
            .complete(&build_judge_prompt(payload), self.sampling)
            .await?;
        let result = match parse_judge_output(&text) {
            Ok(r) => r,
            Err(first) => {
                tracing::warn!(
                    target: "nomatch.judge",
                    stage = "judge.case.repair",
                    case_id = %payload.case_id,
                    error = %first
                );
                let repaired = self
                    .complete(&build_repair_prompt(&text), Sampling::REPAIR)
                    .await?;
                parse_judge_output(&repaired)?
            }
        };

        tracing::debug!(
            target: "nomatch.judge",
            stage = "judge.case.out",
            case_id = %payload.case_id,
            decision = %result.decision,
            confidence = result.confidence
        );
        Ok(result)
    }
}
