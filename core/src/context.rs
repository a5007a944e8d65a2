use std::sync::Arc;

use crate::config::{AppConfig, JudgeConfig};
use crate::error::{JudgeError, PipelineError};
use crate::judge::JudgePlugin;
use crate::pipeline::{run_analysis, AnalysisInput, AnalysisRun};
use crate::retrieval::TrainingIndex;
use crate::turns::TurnTable;

#[async_trait::async_trait]
pub trait JudgeFactory: Send + Sync {
    async fn build_judge(&self, cfg: &JudgeConfig) -> Result<Box<dyn JudgePlugin>, JudgeError>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    run_id: String,
    judge_factory: Option<Arc<dyn JudgeFactory>>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, judge_factory: Option<Arc<dyn JudgeFactory>>) -> Self {
        Self {
            cfg,
            run_id: uuid::Uuid::new_v4().to_string(),
            judge_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// `None` puts the run in no-judge mode: judging disabled, no factory, or
    /// the factory failed.
    pub async fn build_judge(&self) -> Option<Box<dyn JudgePlugin>> {
        if !self.cfg.judge.enabled {
            tracing::info!(
                target: "nomatch.context",
                stage = "context.judge.disabled",
                "judge disabled by configuration"
            );
            return None;
        }
        let Some(factory) = self.judge_factory.as_ref() else {
            tracing::warn!(
                target: "nomatch.context",
                stage = "context.judge.missing",
                "judge_factory missing (cannot build judge)"
            );
            return None;
        };
        match factory.build_judge(&self.cfg.judge).await {
            Ok(judge) => Some(judge),
            Err(e) => {
                tracing::warn!(
                    target: "nomatch.context",
                    stage = "context.judge.unavailable",
                    error = %e,
                    "judge could not be built; continuing without judge"
                );
                None
            }
        }
    }

    pub async fn analyze(
        &self,
        table: TurnTable,
        index: TrainingIndex,
    ) -> Result<AnalysisRun, PipelineError> {
        let judge = self.build_judge().await;
        let input = AnalysisInput {
            run_id: self.run_id.clone(),
            table,
            index,
            judge,
            progress: self.cfg.output.progress,
        };
        run_analysis(input, &self.cfg.analysis).await
    }
}
